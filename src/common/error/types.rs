//! Error type shared by the sniffer, the dispatcher and every decoder.
use crate::common::detection::FormatTag;
use thiserror::Error;

/// Main error type for extraction operations.
///
/// None of the variants is fatal: every failure is returned to the caller and
/// the extractor stays usable for the next buffer.
#[derive(Error, Debug)]
pub enum Error {
    /// The buffer was classified, but no decoder is registered for the format
    #[error("unsupported format: {0}")]
    UnsupportedFormat(FormatTag),

    /// The container was recognized but its structure is broken or truncated
    #[error("malformed {format} document: {reason}")]
    MalformedDocument { format: FormatTag, reason: String },

    /// Decoded content is not representable as text
    #[error("encoding error: {0}")]
    Encoding(String),

    /// The document is password protected
    #[error("{0} document is encrypted")]
    Encrypted(FormatTag),

    /// A configured resource limit was hit while decoding
    #[error("{what} exceeds the configured limit of {limit}")]
    LimitExceeded { what: &'static str, limit: usize },

    /// IO error while reading an input file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build a [`Error::MalformedDocument`] for `format`.
    #[inline]
    pub fn malformed(format: FormatTag, reason: impl Into<String>) -> Self {
        Error::MalformedDocument {
            format,
            reason: reason.into(),
        }
    }

    /// Build a [`Error::LimitExceeded`].
    #[inline]
    pub fn limit(what: &'static str, limit: usize) -> Self {
        Error::LimitExceeded { what, limit }
    }

    /// Whether the error reports a damaged or truncated document.
    #[inline]
    pub fn is_malformed(&self) -> bool {
        matches!(self, Error::MalformedDocument { .. })
    }

    /// Whether the error reports a format without a registered decoder.
    #[inline]
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Error::UnsupportedFormat(_))
    }

    /// The format the error refers to, when there is one.
    pub fn format(&self) -> Option<FormatTag> {
        match self {
            Error::UnsupportedFormat(format)
            | Error::Encrypted(format)
            | Error::MalformedDocument { format, .. } => Some(*format),
            _ => None,
        }
    }
}

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, Error>;
