use std::collections::{HashMap, HashSet};
use std::fmt;

use super::error::{HierarchyError, MatchError};
use super::facet::Facet;

/// The ancestor chain of a shelving location.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ancestors {
    pub library: String,
    pub campus: String,
    pub institution: String,
}

impl Ancestors {
    pub fn new(
        library: impl Into<String>,
        campus: impl Into<String>,
        institution: impl Into<String>,
    ) -> Self {
        Self {
            library: library.into(),
            campus: campus.into(),
            institution: institution.into(),
        }
    }

    /// The id at the given hierarchy level. Returns `None` for the shelving
    /// location itself and for non-location facets.
    #[must_use]
    pub fn at(&self, level: Facet) -> Option<&str> {
        match level {
            Facet::Library => Some(&self.library),
            Facet::Campus => Some(&self.campus),
            Facet::Institution => Some(&self.institution),
            _ => None,
        }
    }
}

/// Immutable map from shelving-location id to its ancestor chain.
///
/// Built wholesale from the full set of location records with
/// [`LocationHierarchyBuilder`] and replaced, never mutated, when location
/// data changes.
#[derive(Debug, Clone, Default)]
pub struct LocationHierarchyIndex {
    chains: HashMap<String, Ancestors>,
}

impl LocationHierarchyIndex {
    #[must_use]
    pub fn builder() -> LocationHierarchyBuilder {
        LocationHierarchyBuilder::default()
    }

    /// Look up the ancestor chain of a shelving location.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::UnknownLocation`] if the id is not in this snapshot.
    pub fn ancestors_of(&self, location: &str) -> Result<&Ancestors, MatchError> {
        self.chains
            .get(location)
            .ok_or_else(|| MatchError::UnknownLocation {
                location: location.to_owned(),
            })
    }

    #[must_use]
    pub fn contains(&self, location: &str) -> bool {
        self.chains.contains_key(location)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.chains.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}

impl fmt::Display for LocationHierarchyIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LocationHierarchyIndex({} locations)", self.chains.len())
    }
}

/// Collects institution, campus, library and location records in any order
/// and resolves every location's chain in [`build()`](Self::build).
#[derive(Debug, Default)]
pub struct LocationHierarchyBuilder {
    institutions: Vec<String>,
    campuses: Vec<(String, String)>,
    libraries: Vec<(String, String)>,
    locations: Vec<(String, String)>,
}

impl LocationHierarchyBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn institution(mut self, id: impl Into<String>) -> Self {
        self.institutions.push(id.into());
        self
    }

    #[must_use]
    pub fn campus(mut self, id: impl Into<String>, institution: impl Into<String>) -> Self {
        self.campuses.push((id.into(), institution.into()));
        self
    }

    #[must_use]
    pub fn library(mut self, id: impl Into<String>, campus: impl Into<String>) -> Self {
        self.libraries.push((id.into(), campus.into()));
        self
    }

    #[must_use]
    pub fn location(mut self, id: impl Into<String>, library: impl Into<String>) -> Self {
        self.locations.push((id.into(), library.into()));
        self
    }

    /// Resolve every shelving location to its full ancestor chain.
    ///
    /// # Errors
    ///
    /// Returns [`HierarchyError`] when an id is supplied twice at the same
    /// level or a record references a parent that was never supplied.
    pub fn build(self) -> Result<LocationHierarchyIndex, HierarchyError> {
        let mut institutions = HashSet::with_capacity(self.institutions.len());
        for id in &self.institutions {
            if !institutions.insert(id.as_str()) {
                return Err(HierarchyError::DuplicateId {
                    level: Facet::Institution,
                    id: id.clone(),
                });
            }
        }

        let campuses = link_level(&self.campuses, Facet::Campus, |parent| {
            institutions.contains(parent)
        })?;
        let libraries = link_level(&self.libraries, Facet::Library, |parent| {
            campuses.contains_key(parent)
        })?;
        let locations = link_level(&self.locations, Facet::Location, |parent| {
            libraries.contains_key(parent)
        })?;

        let chains: HashMap<String, Ancestors> = locations
            .into_iter()
            .map(|(location, library)| {
                let campus = libraries[library];
                let institution = campuses[campus];
                (
                    location.to_owned(),
                    Ancestors::new(library, campus, institution),
                )
            })
            .collect();

        tracing::debug!(
            institutions = institutions.len(),
            campuses = campuses.len(),
            libraries = libraries.len(),
            locations = chains.len(),
            "built location hierarchy"
        );

        Ok(LocationHierarchyIndex { chains })
    }
}

/// Index one level of `(id, parent)` records, checking for duplicates and
/// dangling parents.
fn link_level<'a>(
    records: &'a [(String, String)],
    level: Facet,
    parent_exists: impl Fn(&str) -> bool,
) -> Result<HashMap<&'a str, &'a str>, HierarchyError> {
    let mut linked = HashMap::with_capacity(records.len());
    for (id, parent) in records {
        if !parent_exists(parent) {
            return Err(HierarchyError::UnknownParent {
                level,
                id: id.clone(),
                parent: parent.clone(),
            });
        }
        if linked.insert(id.as_str(), parent.as_str()).is_some() {
            return Err(HierarchyError::DuplicateId {
                level,
                id: id.clone(),
            });
        }
    }
    Ok(linked)
}
