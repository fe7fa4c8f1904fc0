//! Error types for RTF parsing.

use std::fmt;

/// Result type for RTF operations.
pub type RtfResult<T> = Result<T, RtfError>;

/// RTF parsing errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RtfError {
    /// Input does not start with `{\rtf`
    MissingHeader,
    /// Unexpected end of input (inside a group, escape or binary run)
    UnexpectedEof,
    /// A closing brace without a matching opening brace
    UnbalancedGroup,
    /// Invalid control word
    InvalidControlWord(String),
    /// Invalid `\'hh` escape
    InvalidHex(String),
    /// Group nesting deeper than the configured limit
    NestingTooDeep(usize),
}

impl fmt::Display for RtfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RtfError::MissingHeader => write!(f, "missing {{\\rtf header"),
            RtfError::UnexpectedEof => write!(f, "unexpected end of input"),
            RtfError::UnbalancedGroup => write!(f, "unbalanced closing brace"),
            RtfError::InvalidControlWord(msg) => write!(f, "invalid control word: {}", msg),
            RtfError::InvalidHex(msg) => write!(f, "invalid hex escape: {}", msg),
            RtfError::NestingTooDeep(limit) => {
                write!(f, "group nesting deeper than {}", limit)
            },
        }
    }
}

impl std::error::Error for RtfError {}
