use std::fmt;

use super::condition::Condition;
use super::facet::Facet;
use super::location::Ancestors;
use super::policy::{PolicyKind, PolicyMap};
use super::query::Query;

/// One conditional policy assignment, identified by its source line number.
///
/// A line with every facet `Any` is a legal catch-all and is distinct from the
/// rule set's fallback policies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleLine {
    pub(crate) line: u32,
    pub(crate) conditions: [Condition; Facet::COUNT],
    pub(crate) policies: PolicyMap,
    pub(crate) specificity: u8,
}

impl RuleLine {
    pub(crate) fn new(line: u32, conditions: [Condition; Facet::COUNT], policies: PolicyMap) -> Self {
        let specificity = score(&conditions);
        Self {
            line,
            conditions,
            policies,
            specificity,
        }
    }

    /// Source line number, starting at 1.
    #[must_use]
    pub fn line(&self) -> u32 {
        self.line
    }

    #[must_use]
    pub fn condition(&self, facet: Facet) -> &Condition {
        &self.conditions[facet.slot()]
    }

    /// The policy this line assigns for `kind`, if any.
    #[must_use]
    pub fn policy(&self, kind: PolicyKind) -> Option<&str> {
        self.policies.get(kind)
    }

    #[must_use]
    pub fn policies(&self) -> &PolicyMap {
        &self.policies
    }

    /// Specificity score in `0..=7`: one point per constrained item-type,
    /// loan-type and patron-group facet, plus the rank of the most specific
    /// constrained location level.
    #[must_use]
    pub fn specificity(&self) -> u8 {
        self.specificity
    }

    #[must_use]
    pub fn is_catch_all(&self) -> bool {
        self.conditions.iter().all(Condition::is_any)
    }

    /// Whether every facet condition on this line accepts the query values.
    ///
    /// Location-level conditions are tested against the value at their own
    /// level of the chain, so a line naming an institution matches every
    /// location beneath it.
    #[must_use]
    pub fn matches(&self, query: &Query<'_>, ancestors: &Ancestors) -> bool {
        Facet::ALL.into_iter().all(|facet| {
            let value = match facet {
                Facet::ItemType => query.item_type,
                Facet::LoanType => query.loan_type,
                Facet::PatronGroup => query.patron_group,
                Facet::Location => query.location,
                Facet::Institution => ancestors.institution.as_str(),
                Facet::Campus => ancestors.campus.as_str(),
                Facet::Library => ancestors.library.as_str(),
            };
            self.condition(facet).accepts(value)
        })
    }
}

fn score(conditions: &[Condition; Facet::COUNT]) -> u8 {
    let mut direct = 0;
    let mut location_rank = 0;
    for facet in Facet::ALL {
        if conditions[facet.slot()].is_any() {
            continue;
        }
        match facet.location_rank() {
            Some(rank) => location_rank = location_rank.max(rank),
            None => direct += 1,
        }
    }
    direct + location_rank
}

impl fmt::Display for RuleLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.line)?;
        if self.is_catch_all() {
            f.write_str("all")?;
        } else {
            let mut first = true;
            for facet in Facet::ALL {
                let condition = self.condition(facet);
                if condition.is_any() {
                    continue;
                }
                if !first {
                    f.write_str(" + ")?;
                }
                write!(f, "{} {condition}", facet.letter())?;
                first = false;
            }
        }
        write!(f, " => {}", self.policies)
    }
}
