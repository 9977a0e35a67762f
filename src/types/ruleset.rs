use std::fmt;

use super::condition::Condition;
use super::error::{CompileError, MatchError};
use super::facet::Facet;
use super::location::LocationHierarchyIndex;
use super::matches::{Match, MatchList};
use super::policy::{PolicyKind, PolicyMap};
use super::query::Query;
use super::rule::RuleLine;
use crate::matcher::RuleMatcher;
use crate::parse::{ParsedFallback, ParsedRuleSet};

/// Builder for constructing a [`CompiledRuleSet`] without rule text.
///
/// Fallbacks and lines are numbered from 1 in the order they are added, the
/// same way physical lines are numbered in rule text.
///
/// # Example
///
/// ```
/// use circ_rules::{Condition, Facet, PolicyKind, RuleSetBuilder};
///
/// let rules = RuleSetBuilder::new()
///     .fallback(PolicyKind::Loan, "no-loan")
///     .line(|l| {
///         l.when(Facet::ItemType, Condition::is_in(["book"]))
///             .assign(PolicyKind::Loan, "three-week")
///     })
///     .compile()
///     .unwrap();
/// assert_eq!(rules.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct RuleSetBuilder {
    next_line: u32,
    parsed: ParsedRuleSet,
}

/// Intermediate builder passed to the line definition closure.
#[derive(Debug, Default)]
pub struct LineBuilder {
    conditions: [Condition; Facet::COUNT],
    policies: PolicyMap,
}

impl RuleSetBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn take_line_number(&mut self) -> u32 {
        self.next_line += 1;
        self.next_line
    }

    /// Declare the policy used for `kind` when no rule line matches.
    #[must_use]
    pub fn fallback(mut self, kind: PolicyKind, policy_id: impl Into<String>) -> Self {
        let line = self.take_line_number();
        self.parsed.fallbacks.push(ParsedFallback {
            line,
            kind,
            policy_id: policy_id.into(),
        });
        self
    }

    /// Append a rule line. Facets the closure leaves untouched are `Any`.
    #[must_use]
    pub fn line(mut self, f: impl FnOnce(LineBuilder) -> LineBuilder) -> Self {
        let line = self.take_line_number();
        let built = f(LineBuilder::default());
        self.parsed
            .lines
            .push(RuleLine::new(line, built.conditions, built.policies));
        self
    }

    /// Compile into an immutable `CompiledRuleSet`.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError`] if validation fails.
    pub fn compile(self) -> Result<CompiledRuleSet, CompileError> {
        crate::compile::compile(self.parsed)
    }
}

impl LineBuilder {
    /// Constrain `facet`. A later call for the same facet replaces the earlier one.
    #[must_use]
    pub fn when(mut self, facet: Facet, condition: Condition) -> Self {
        self.conditions[facet.slot()] = condition;
        self
    }

    #[must_use]
    pub fn assign(mut self, kind: PolicyKind, policy_id: impl Into<String>) -> Self {
        self.policies.insert(kind, policy_id);
        self
    }
}

/// A compiled, immutable rule set. Thread-safe and designed to live behind `Arc`.
///
/// Replaced wholesale when the rule text changes.
#[derive(Debug, Clone)]
pub struct CompiledRuleSet {
    pub(crate) lines: Vec<RuleLine>,
    pub(crate) defaults: PolicyMap,
    /// Per policy kind, indices into `lines` of the lines assigning that kind,
    /// sorted by specificity then line number, both descending.
    pub(crate) ranked: [Vec<usize>; PolicyKind::COUNT],
}

impl CompiledRuleSet {
    /// Parse rule text and compile it.
    ///
    /// # Errors
    ///
    /// Returns [`Error`](crate::Error) on a syntax or compile failure. No
    /// partial rule set is ever produced.
    pub fn from_text(input: &str) -> Result<Self, crate::Error> {
        let parsed = crate::parse::parse(input)?;
        let rules = crate::compile::compile(parsed)?;
        Ok(rules)
    }

    /// Read a rule file and compile it.
    ///
    /// # Errors
    ///
    /// Returns [`Error`](crate::Error) on I/O, syntax, or compile failure.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, crate::Error> {
        let input = std::fs::read_to_string(path)?;
        Self::from_text(&input)
    }

    /// Bind this rule set to a location snapshot for matching.
    #[must_use]
    pub fn matcher<'a>(&'a self, locations: &'a LocationHierarchyIndex) -> RuleMatcher<'a> {
        RuleMatcher::new(self, locations)
    }

    /// Resolve the single best match for `query`.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError`] for an unknown location or a policy kind with no
    /// fallback in this rule set.
    pub fn resolve_one(
        &self,
        locations: &LocationHierarchyIndex,
        query: &Query<'_>,
    ) -> Result<Match, MatchError> {
        self.matcher(locations).best(query)
    }

    /// Resolve every match for `query`, most specific first.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError`] for an unknown location or a policy kind with no
    /// fallback in this rule set.
    pub fn resolve_all(
        &self,
        locations: &LocationHierarchyIndex,
        query: &Query<'_>,
    ) -> Result<MatchList, MatchError> {
        self.matcher(locations).all(query)
    }

    /// Rule lines in source order.
    #[must_use]
    pub fn lines(&self) -> &[RuleLine] {
        &self.lines
    }

    /// Look up a rule line by its source line number.
    #[must_use]
    pub fn line(&self, number: u32) -> Option<&RuleLine> {
        self.lines
            .binary_search_by_key(&number, RuleLine::line)
            .ok()
            .map(|idx| &self.lines[idx])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The fallback policy for `kind`, if declared.
    #[must_use]
    pub fn default_policy(&self, kind: PolicyKind) -> Option<&str> {
        self.defaults.get(kind)
    }

    #[must_use]
    pub fn defaults(&self) -> &PolicyMap {
        &self.defaults
    }

    /// Lines assigning `kind`, in the order the matcher tries them.
    pub fn ranked_lines(&self, kind: PolicyKind) -> impl Iterator<Item = &RuleLine> {
        self.ranked[kind.slot()].iter().map(|&idx| &self.lines[idx])
    }
}

#[cfg(feature = "binary-cache")]
impl CompiledRuleSet {
    /// Serialize this compiled rule set to a byte vector.
    ///
    /// The optional `source_text` is hashed (BLAKE3) and embedded in the
    /// payload metadata so callers can tell when the cache is stale.
    ///
    /// # Errors
    ///
    /// Returns [`SerializeError`](crate::serial::SerializeError) if encoding fails.
    pub fn to_bytes(
        &self,
        source_text: Option<&str>,
    ) -> Result<Vec<u8>, crate::serial::SerializeError> {
        crate::serial::encode(self, source_text)
    }

    /// Deserialize a rule set produced by [`to_bytes`](Self::to_bytes).
    ///
    /// # Errors
    ///
    /// Returns [`DeserializeError`](crate::serial::DeserializeError) on
    /// format, integrity, or validation failure.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, crate::serial::DeserializeError> {
        crate::serial::decode(bytes)
    }

    /// # Errors
    ///
    /// Returns [`SerializeError`](crate::serial::SerializeError) on
    /// encoding or I/O failure.
    pub fn to_binary_file(
        &self,
        path: impl AsRef<std::path::Path>,
        source_text: Option<&str>,
    ) -> Result<(), crate::serial::SerializeError> {
        let bytes = self.to_bytes(source_text)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`DeserializeError`](crate::serial::DeserializeError) on
    /// I/O, format, integrity, or validation failure.
    pub fn from_binary_file(
        path: impl AsRef<std::path::Path>,
    ) -> Result<Self, crate::serial::DeserializeError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }
}

impl fmt::Display for CompiledRuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CompiledRuleSet({} lines, fallback: {})",
            self.lines.len(),
            self.defaults,
        )
    }
}
