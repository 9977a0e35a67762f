use thiserror::Error;

use crate::parse::ParseError;
use crate::{CompileError, HierarchyError, MatchError};

/// Unified error type covering parsing, compilation, location indexing,
/// matching and I/O.
///
/// Returned by convenience methods like
/// [`CompiledRuleSet::from_text()`](crate::CompiledRuleSet::from_text) and
/// [`CompiledRuleSet::from_file()`](crate::CompiledRuleSet::from_file).
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),

    #[error(transparent)]
    Match(#[from] MatchError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[cfg(feature = "binary-cache")]
    #[error(transparent)]
    Serialize(#[from] crate::serial::SerializeError),

    #[cfg(feature = "binary-cache")]
    #[error(transparent)]
    Deserialize(#[from] crate::serial::DeserializeError),
}
