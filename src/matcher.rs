use crate::{
    Ancestors, CompiledRuleSet, LocationHierarchyIndex, Match, MatchError, MatchList, Query,
    RuleLine,
};

/// Matches queries against one compiled rule set and one location snapshot.
///
/// Holds only borrows; every call is a pure function of the two snapshots and
/// the query, so a matcher can be shared freely across threads.
#[derive(Debug, Clone, Copy)]
pub struct RuleMatcher<'a> {
    rules: &'a CompiledRuleSet,
    locations: &'a LocationHierarchyIndex,
}

impl<'a> RuleMatcher<'a> {
    #[must_use]
    pub fn new(rules: &'a CompiledRuleSet, locations: &'a LocationHierarchyIndex) -> Self {
        Self { rules, locations }
    }

    /// The single best match: highest specificity, then highest line number.
    /// Falls back to the kind's default policy (line 0) when nothing matches.
    ///
    /// # Errors
    ///
    /// [`MatchError::UnknownPolicyKind`] if the rule set declares no fallback
    /// for the query's kind, [`MatchError::UnknownLocation`] if the location
    /// is not in the hierarchy snapshot.
    pub fn best(&self, query: &Query<'_>) -> Result<Match, MatchError> {
        let (fallback, ancestors) = self.prepare(query)?;

        // Lines are pre-sorted, so the first hit is the winner.
        let found = self
            .rules
            .ranked_lines(query.kind)
            .find(|line| line.matches(query, ancestors))
            .and_then(|line| to_match(line, query))
            .unwrap_or_else(|| Match::fallback(fallback));

        tracing::trace!(
            kind = %query.kind,
            line = found.line(),
            policy = found.policy_id(),
            "resolved circulation rule"
        );
        Ok(found)
    }

    /// Every matching line, ordered by specificity then line number (both
    /// descending), followed by the fallback.
    ///
    /// # Errors
    ///
    /// Same as [`best`](Self::best).
    pub fn all(&self, query: &Query<'_>) -> Result<MatchList, MatchError> {
        let (fallback, ancestors) = self.prepare(query)?;

        let mut matches: Vec<Match> = self
            .rules
            .ranked_lines(query.kind)
            .filter(|line| line.matches(query, ancestors))
            .filter_map(|line| to_match(line, query))
            .collect();
        matches.push(Match::fallback(fallback));

        tracing::trace!(
            kind = %query.kind,
            matches = matches.len(),
            "resolved all circulation rules"
        );
        Ok(MatchList::new(matches))
    }

    fn prepare(&self, query: &Query<'_>) -> Result<(&'a str, &'a Ancestors), MatchError> {
        let fallback = self
            .rules
            .default_policy(query.kind)
            .ok_or(MatchError::UnknownPolicyKind { kind: query.kind })?;
        let ancestors = self.locations.ancestors_of(query.location)?;
        Ok((fallback, ancestors))
    }
}

fn to_match(line: &RuleLine, query: &Query<'_>) -> Option<Match> {
    line.policy(query.kind)
        .map(|id| Match::new(id, line.line(), line.specificity()))
}
