//! Common types and utilities shared across formats.
//!
//! Format detection, the error type, text encodings and the container
//! helpers used by more than one decoder live here.

// Submodule declarations
pub mod archive;
pub mod binary;
pub mod bom;
pub mod detection;
pub mod encoding;
pub mod error;
pub mod text_builder;
#[cfg(any(feature = "ooxml", feature = "odf", feature = "epub"))]
pub mod xml;

// Re-exports for convenience
pub use detection::FormatTag;
pub use error::{Error, Result};
