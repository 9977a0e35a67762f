use std::fmt;

/// One independent dimension a rule line can constrain.
///
/// The first three facets are compared directly against the query. The last
/// four form the location hierarchy and are compared against the query
/// location's ancestor chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Facet {
    ItemType,
    LoanType,
    PatronGroup,
    Institution,
    Campus,
    Library,
    Location,
}

impl Facet {
    /// All facets, in slot order.
    pub const ALL: [Facet; 7] = [
        Facet::ItemType,
        Facet::LoanType,
        Facet::PatronGroup,
        Facet::Institution,
        Facet::Campus,
        Facet::Library,
        Facet::Location,
    ];

    pub(crate) const COUNT: usize = Self::ALL.len();

    /// Position of this facet in a line's condition array.
    #[must_use]
    pub(crate) fn slot(self) -> usize {
        self as usize
    }

    /// The single-letter keyword used in rule text.
    #[must_use]
    pub fn letter(self) -> char {
        match self {
            Facet::ItemType => 'm',
            Facet::LoanType => 't',
            Facet::PatronGroup => 'g',
            Facet::Institution => 'a',
            Facet::Campus => 'b',
            Facet::Library => 'c',
            Facet::Location => 's',
        }
    }

    /// The long keyword accepted in rule text.
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            Facet::ItemType => "item-type",
            Facet::LoanType => "loan-type",
            Facet::PatronGroup => "patron-group",
            Facet::Institution => "institution",
            Facet::Campus => "campus",
            Facet::Library => "library",
            Facet::Location => "location",
        }
    }

    /// Resolve a rule-text keyword (letter or long form).
    #[must_use]
    pub fn from_keyword(word: &str) -> Option<Facet> {
        Self::ALL
            .into_iter()
            .find(|f| word == f.keyword() || (word.len() == 1 && word.starts_with(f.letter())))
    }

    /// Specificity contributed by a location facet: shelving location 4,
    /// library 3, campus 2, institution 1. Non-location facets return `None`.
    #[must_use]
    pub fn location_rank(self) -> Option<u8> {
        match self {
            Facet::Institution => Some(1),
            Facet::Campus => Some(2),
            Facet::Library => Some(3),
            Facet::Location => Some(4),
            Facet::ItemType | Facet::LoanType | Facet::PatronGroup => None,
        }
    }

    #[must_use]
    pub fn is_location(self) -> bool {
        self.location_rank().is_some()
    }
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}
