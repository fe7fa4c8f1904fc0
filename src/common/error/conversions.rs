//! Error conversion implementations.
//!
//! This module contains From trait implementations to convert from internal
//! error types to the unified Error type.

use super::types::Error;
use crate::common::detection::FormatTag;

#[cfg(feature = "rtf")]
impl From<crate::rtf::RtfError> for Error {
    fn from(err: crate::rtf::RtfError) -> Self {
        match err {
            crate::rtf::RtfError::NestingTooDeep(limit) => Error::limit("RTF group nesting", limit),
            other => Error::malformed(FormatTag::Rtf, other.to_string()),
        }
    }
}

impl From<crate::ole::OleError> for Error {
    fn from(err: crate::ole::OleError) -> Self {
        match err {
            crate::ole::OleError::StreamTooLarge { limit } => Error::limit("OLE stream", limit),
            other => Error::malformed(FormatTag::OleCompound, other.to_string()),
        }
    }
}
