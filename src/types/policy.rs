use std::fmt;

/// Which category of policy is being resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PolicyKind {
    Loan,
    Request,
    Notice,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 3] = [PolicyKind::Loan, PolicyKind::Request, PolicyKind::Notice];

    pub(crate) const COUNT: usize = Self::ALL.len();

    pub(crate) fn slot(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn letter(self) -> char {
        match self {
            PolicyKind::Loan => 'l',
            PolicyKind::Request => 'r',
            PolicyKind::Notice => 'n',
        }
    }

    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            PolicyKind::Loan => "loan",
            PolicyKind::Request => "request",
            PolicyKind::Notice => "notice",
        }
    }

    /// Resolve a rule-text keyword (letter or long form).
    #[must_use]
    pub fn from_keyword(word: &str) -> Option<PolicyKind> {
        Self::ALL
            .into_iter()
            .find(|k| word == k.keyword() || (word.len() == 1 && word.starts_with(k.letter())))
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Per-kind storage for policy ids, indexed by [`PolicyKind`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyMap {
    slots: [Option<String>; PolicyKind::COUNT],
}

impl PolicyMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, kind: PolicyKind) -> Option<&str> {
        self.slots[kind.slot()].as_deref()
    }

    /// Store `id` for `kind`, returning the id it replaced.
    pub fn insert(&mut self, kind: PolicyKind, id: impl Into<String>) -> Option<String> {
        self.slots[kind.slot()].replace(id.into())
    }

    #[must_use]
    pub fn contains(&self, kind: PolicyKind) -> bool {
        self.slots[kind.slot()].is_some()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Iterate over the assigned (kind, id) pairs in kind order.
    pub fn iter(&self) -> impl Iterator<Item = (PolicyKind, &str)> {
        PolicyKind::ALL
            .into_iter()
            .filter_map(|k| self.get(k).map(|id| (k, id)))
    }

    pub fn kinds(&self) -> impl Iterator<Item = PolicyKind> + '_ {
        self.iter().map(|(k, _)| k)
    }
}

impl fmt::Display for PolicyMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (kind, id) in self.iter() {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{} {id}", kind.letter())?;
            first = false;
        }
        Ok(())
    }
}
