use std::fmt;

/// Malformed rule text. Fatal to compilation: no rule set is produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    line: u32,
    token: String,
    message: String,
}

impl ParseError {
    pub(crate) fn new(line: u32, token: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            line,
            token: token.into(),
            message: message.into(),
        }
    }

    /// Source line number of the malformed line, starting at 1.
    #[must_use]
    pub fn line(&self) -> u32 {
        self.line
    }

    /// The offending token, empty when the line ended early.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.token.is_empty() {
            write!(
                f,
                "syntax error on line {} at end of line: {}",
                self.line, self.message
            )
        } else {
            write!(
                f,
                "syntax error on line {} at '{}': {}",
                self.line, self.token, self.message
            )
        }
    }
}

impl std::error::Error for ParseError {}
