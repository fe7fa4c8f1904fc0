//! File format detection.
//!
//! Formats are recognized from their content alone (signatures and
//! structure), never from file names or declared media types. Sniffing reads
//! a bounded prefix; container probing opens ZIP and OLE2 directories.

pub mod functions;
pub mod odf;
pub mod ole2;
pub mod ooxml;
pub mod pdf;
pub mod rtf;
pub mod text;
pub mod types;
pub mod utils;
pub mod zip;

pub use functions::{detect_format, detect_format_with, probe, sniff};
pub use types::FormatTag;
