use thiserror::Error;

use super::facet::Facet;
use super::policy::PolicyKind;

/// Semantic errors found after rule text has been parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("line {line}: {kind} policy assigned but no fallback-policy declared for it")]
    MissingDefaultPolicy { kind: PolicyKind, line: u32 },

    #[error("line {line}: fallback-policy for {kind} already declared")]
    DuplicateDefault { kind: PolicyKind, line: u32 },

    #[error("line {line}: rule line assigns no policy")]
    NoAssignments { line: u32 },
}

/// Errors raised while building a [`LocationHierarchyIndex`](super::LocationHierarchyIndex).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HierarchyError {
    #[error("{level} '{id}' references unknown parent '{parent}'")]
    UnknownParent {
        level: Facet,
        id: String,
        parent: String,
    },

    #[error("duplicate {level} id '{id}'")]
    DuplicateId { level: Facet, id: String },
}

/// Errors raised while matching a query against a compiled rule set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error("unknown shelving location '{location}'")]
    UnknownLocation { location: String },

    #[error("rule set has no fallback-policy for {kind} policies")]
    UnknownPolicyKind { kind: PolicyKind },
}
