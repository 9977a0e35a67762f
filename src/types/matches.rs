use std::fmt;
use std::ops::Deref;

/// The policy selected for a query and the rule line that produced it.
///
/// Line `0` marks the fallback policy, used when no rule line matched.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[must_use]
pub struct Match {
    policy_id: String,
    #[cfg_attr(feature = "serde", serde(rename = "circulationRuleLine"))]
    line: u32,
    specificity: u8,
}

impl fmt::Display for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_fallback() {
            write!(f, "{} (fallback)", self.policy_id)
        } else {
            write!(
                f,
                "{} (line {}, specificity {})",
                self.policy_id, self.line, self.specificity
            )
        }
    }
}

impl Match {
    pub fn new(policy_id: impl Into<String>, line: u32, specificity: u8) -> Self {
        Self {
            policy_id: policy_id.into(),
            line,
            specificity,
        }
    }

    pub(crate) fn fallback(policy_id: impl Into<String>) -> Self {
        Self::new(policy_id, 0, 0)
    }

    #[must_use]
    pub fn policy_id(&self) -> &str {
        &self.policy_id
    }

    #[must_use]
    pub fn into_policy_id(self) -> String {
        self.policy_id
    }

    #[must_use]
    pub fn line(&self) -> u32 {
        self.line
    }

    #[must_use]
    pub fn specificity(&self) -> u8 {
        self.specificity
    }

    /// Whether this is the rule set's fallback rather than a rule line.
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.line == 0
    }
}

/// Every match for a query, most specific first, ending with the fallback.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[must_use]
pub struct MatchList {
    matches: Vec<Match>,
}

impl MatchList {
    pub(crate) fn new(matches: Vec<Match>) -> Self {
        Self { matches }
    }

    /// The best match, identical to the single-best resolution.
    #[must_use]
    pub fn best(&self) -> Option<&Match> {
        self.matches.first()
    }

    /// Policy ids in rank order.
    pub fn policy_ids(&self) -> impl Iterator<Item = &str> {
        self.matches.iter().map(Match::policy_id)
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<Match> {
        self.matches
    }
}

impl Deref for MatchList {
    type Target = [Match];

    fn deref(&self) -> &[Match] {
        &self.matches
    }
}

impl IntoIterator for MatchList {
    type Item = Match;
    type IntoIter = std::vec::IntoIter<Match>;

    fn into_iter(self) -> Self::IntoIter {
        self.matches.into_iter()
    }
}

impl<'a> IntoIterator for &'a MatchList {
    type Item = &'a Match;
    type IntoIter = std::slice::Iter<'a, Match>;

    fn into_iter(self) -> Self::IntoIter {
        self.matches.iter()
    }
}

impl fmt::Display for MatchList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (rank, m) in self.matches.iter().enumerate() {
            if rank > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{}. {m}", rank + 1)?;
        }
        Ok(())
    }
}
