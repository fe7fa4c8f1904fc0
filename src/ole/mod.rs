//! OLE2 compound file support.
//!
//! The compound file reader is always available because container probing
//! needs it to tell Word, Excel and PowerPoint binaries apart. Text
//! extraction from Word documents is behind the `ole` feature.

/// Constants for OLE file format
pub mod consts;

/// Main OLE file parsing implementation
mod file;

/// Legacy Word document (.doc) decoder
#[cfg(feature = "ole")]
pub mod doc;

#[cfg(test)]
pub(crate) mod test_support;

pub use file::{OleError, OleFile, is_ole_file};
