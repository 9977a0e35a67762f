use std::collections::BTreeSet;
use std::fmt;

/// A single facet constraint within a rule line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Condition {
    /// Matches every value and contributes no specificity.
    #[default]
    Any,
    /// Matches when the query value is a member of the set.
    In(BTreeSet<String>),
    /// Matches when the query value is absent from the set.
    NotIn(BTreeSet<String>),
}

impl Condition {
    pub fn is_in<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Condition::In(ids.into_iter().map(Into::into).collect())
    }

    pub fn not_in<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Condition::NotIn(ids.into_iter().map(Into::into).collect())
    }

    #[must_use]
    pub fn is_any(&self) -> bool {
        matches!(self, Condition::Any)
    }

    /// Test a single query value against this condition.
    #[must_use]
    pub fn accepts(&self, value: &str) -> bool {
        match self {
            Condition::Any => true,
            Condition::In(ids) => ids.contains(value),
            Condition::NotIn(ids) => !ids.contains(value),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (prefix, ids) = match self {
            Condition::Any => return f.write_str("*"),
            Condition::In(ids) => ("", ids),
            Condition::NotIn(ids) => ("!", ids),
        };
        f.write_str(prefix)?;
        let mut first = true;
        for id in ids {
            if !first {
                f.write_str(", ")?;
            }
            f.write_str(id)?;
            first = false;
        }
        Ok(())
    }
}
