use std::sync::Arc;

use crate::{
    CompiledRuleSet, LocationHierarchyIndex, MatchError, MatchList, PolicyKind, Query,
    RuleMatcher,
};

/// Narrow resolution surface for circulation workflows.
///
/// Holds the rule set and location hierarchy as shared immutable snapshots.
/// Cloning is cheap, and [`with_rules`](Self::with_rules) /
/// [`with_locations`](Self::with_locations) produce a new resolver that
/// shares the untouched snapshot, so an owner can swap in fresh data while
/// in-flight callers finish against the old one.
#[derive(Debug, Clone)]
pub struct PolicyResolver {
    rules: Arc<CompiledRuleSet>,
    locations: Arc<LocationHierarchyIndex>,
}

impl PolicyResolver {
    pub fn new(
        rules: impl Into<Arc<CompiledRuleSet>>,
        locations: impl Into<Arc<LocationHierarchyIndex>>,
    ) -> Self {
        Self {
            rules: rules.into(),
            locations: locations.into(),
        }
    }

    #[must_use]
    pub fn with_rules(&self, rules: impl Into<Arc<CompiledRuleSet>>) -> Self {
        Self {
            rules: rules.into(),
            locations: Arc::clone(&self.locations),
        }
    }

    #[must_use]
    pub fn with_locations(&self, locations: impl Into<Arc<LocationHierarchyIndex>>) -> Self {
        Self {
            rules: Arc::clone(&self.rules),
            locations: locations.into(),
        }
    }

    #[must_use]
    pub fn rules(&self) -> &Arc<CompiledRuleSet> {
        &self.rules
    }

    #[must_use]
    pub fn locations(&self) -> &Arc<LocationHierarchyIndex> {
        &self.locations
    }

    fn matcher(&self) -> RuleMatcher<'_> {
        RuleMatcher::new(&self.rules, &self.locations)
    }

    /// The policy id that applies to the transaction.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError`] for an unknown location or a policy kind the
    /// rule set has no fallback for.
    pub fn resolve_one(
        &self,
        kind: PolicyKind,
        item_type: &str,
        loan_type: &str,
        patron_group: &str,
        location: &str,
    ) -> Result<String, MatchError> {
        let query = Query::new(kind, item_type, loan_type, patron_group, location);
        self.matcher()
            .best(&query)
            .map(crate::Match::into_policy_id)
    }

    /// Every policy that could apply, most specific first, ending with the fallback.
    ///
    /// # Errors
    ///
    /// Same as [`resolve_one`](Self::resolve_one).
    pub fn resolve_all(
        &self,
        kind: PolicyKind,
        item_type: &str,
        loan_type: &str,
        patron_group: &str,
        location: &str,
    ) -> Result<MatchList, MatchError> {
        let query = Query::new(kind, item_type, loan_type, patron_group, location);
        self.matcher().all(&query)
    }

    /// # Errors
    ///
    /// Same as [`resolve_one`](Self::resolve_one).
    pub fn loan_policy(
        &self,
        item_type: &str,
        loan_type: &str,
        patron_group: &str,
        location: &str,
    ) -> Result<String, MatchError> {
        self.resolve_one(PolicyKind::Loan, item_type, loan_type, patron_group, location)
    }

    /// # Errors
    ///
    /// Same as [`resolve_all`](Self::resolve_all).
    pub fn loan_policies(
        &self,
        item_type: &str,
        loan_type: &str,
        patron_group: &str,
        location: &str,
    ) -> Result<MatchList, MatchError> {
        self.resolve_all(PolicyKind::Loan, item_type, loan_type, patron_group, location)
    }

    /// # Errors
    ///
    /// Same as [`resolve_one`](Self::resolve_one).
    pub fn request_policy(
        &self,
        item_type: &str,
        loan_type: &str,
        patron_group: &str,
        location: &str,
    ) -> Result<String, MatchError> {
        self.resolve_one(PolicyKind::Request, item_type, loan_type, patron_group, location)
    }

    /// # Errors
    ///
    /// Same as [`resolve_all`](Self::resolve_all).
    pub fn request_policies(
        &self,
        item_type: &str,
        loan_type: &str,
        patron_group: &str,
        location: &str,
    ) -> Result<MatchList, MatchError> {
        self.resolve_all(PolicyKind::Request, item_type, loan_type, patron_group, location)
    }

    /// # Errors
    ///
    /// Same as [`resolve_one`](Self::resolve_one).
    pub fn notice_policy(
        &self,
        item_type: &str,
        loan_type: &str,
        patron_group: &str,
        location: &str,
    ) -> Result<String, MatchError> {
        self.resolve_one(PolicyKind::Notice, item_type, loan_type, patron_group, location)
    }

    /// # Errors
    ///
    /// Same as [`resolve_all`](Self::resolve_all).
    pub fn notice_policies(
        &self,
        item_type: &str,
        loan_type: &str,
        patron_group: &str,
        location: &str,
    ) -> Result<MatchList, MatchError> {
        self.resolve_all(PolicyKind::Notice, item_type, loan_type, patron_group, location)
    }
}
