//! Unified error types for textractor.
//!
//! Every decoder reports failures through the single [`Error`] type so callers
//! can tell an unsupported document apart from a damaged one without knowing
//! which decoder ran.

// Submodule declarations
pub mod conversions;
pub mod types;

// Re-exports
pub use types::{Error, Result};
