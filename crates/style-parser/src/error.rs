//! Parse error types.

use source_map::Span;
use thiserror::Error;

/// An error that occurred during parsing.
///
/// Parsing always recovers; errors are collected next to the tree.
#[derive(Debug, Clone, Error)]
#[error("{kind}")]
pub struct ParseError {
    /// The kind of error.
    pub kind: ParseErrorKind,
    /// The location in the source where the error occurred.
    pub span: Span,
}

impl ParseError {
    /// Creates a new parse error.
    pub fn new(kind: ParseErrorKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// The kind of parse error.
#[derive(Debug, Clone, Error)]
pub enum ParseErrorKind {
    /// An unexpected token was encountered.
    #[error("unexpected token: expected {expected}, found {found}")]
    UnexpectedToken {
        /// What was expected.
        expected: String,
        /// What was found.
        found: String,
    },

    /// An unexpected end of file was encountered.
    #[error("unexpected end of file: expected {expected}")]
    UnexpectedEof {
        /// What was expected.
        expected: String,
    },

    /// A selector could not be parsed.
    #[error("invalid selector: {message}")]
    InvalidSelector {
        /// A description of the problem.
        message: String,
    },

    /// A `var()` usage could not be parsed.
    #[error("invalid var usage: {message}")]
    InvalidVarUsage {
        /// A description of the problem.
        message: String,
    },

    /// An unclosed tag was found.
    #[error("unclosed tag: <{tag_name}>")]
    UnclosedTag {
        /// The name of the unclosed tag.
        tag_name: String,
    },

    /// A mismatched closing tag was found.
    #[error("mismatched closing tag: expected </{expected}>, found </{found}>")]
    MismatchedClosingTag {
        /// The expected tag name.
        expected: String,
        /// The found tag name.
        found: String,
    },

    /// An invalid attribute was found.
    #[error("invalid attribute: {message}")]
    InvalidAttribute {
        /// A description of the problem.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = ParseError::new(
            ParseErrorKind::UnexpectedToken {
                expected: "':'".to_string(),
                found: "'{'".to_string(),
            },
            Span::new(0u32, 1u32),
        );
        assert_eq!(
            error.to_string(),
            "unexpected token: expected ':', found '{'"
        );
    }

    #[test]
    fn test_var_usage_error_display() {
        let error = ParseError::new(
            ParseErrorKind::InvalidVarUsage {
                message: "fallback must be a single term".to_string(),
            },
            Span::new(0u32, 1u32),
        );
        assert_eq!(
            error.to_string(),
            "invalid var usage: fallback must be a single term"
        );
    }
}
