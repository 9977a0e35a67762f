use std::fmt;

use super::policy::PolicyKind;

/// The transient input of one resolution: the ids describing a circulation
/// transaction plus the kind of policy being resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Query<'a> {
    pub kind: PolicyKind,
    pub item_type: &'a str,
    pub loan_type: &'a str,
    pub patron_group: &'a str,
    pub location: &'a str,
}

impl<'a> Query<'a> {
    #[must_use]
    pub fn new(
        kind: PolicyKind,
        item_type: &'a str,
        loan_type: &'a str,
        patron_group: &'a str,
        location: &'a str,
    ) -> Self {
        Self {
            kind,
            item_type,
            loan_type,
            patron_group,
            location,
        }
    }

    /// The same query for another policy kind.
    #[must_use]
    pub fn with_kind(self, kind: PolicyKind) -> Self {
        Self { kind, ..self }
    }
}

impl fmt::Display for Query<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} policy for m {} t {} g {} s {}",
            self.kind, self.item_type, self.loan_type, self.patron_group, self.location
        )
    }
}
