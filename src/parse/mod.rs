mod error;
mod grammar;
mod parser;

pub use error::ParseError;
pub use parser::{ParsedFallback, ParsedRuleSet};

/// Parse circulation rule text into a [`ParsedRuleSet`].
///
/// Lines are numbered from 1 in source order, counting blank and comment
/// lines, and parsing stops at the first malformed line.
///
/// # Errors
///
/// Returns [`ParseError`] carrying the line number and offending token.
pub fn parse(input: &str) -> Result<ParsedRuleSet, ParseError> {
    parser::parse_rules(input)
}
