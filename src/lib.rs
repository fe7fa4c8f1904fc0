//! Textractor - plain text extraction from documents of unknown type
//!
//! Hand the library a byte buffer and it returns the readable text inside,
//! whatever the buffer holds. The format is recognized from the content
//! alone; file names and MIME hints are never consulted.
//!
//! # Features
//!
//! - **Format sniffing**: Magic numbers and structural signatures over a
//!   bounded prefix, refined by a look into ZIP and OLE2 containers
//! - **PDF**: Text of the content streams (`pdf` feature)
//! - **RTF**: Single-pass group parser with codepage and Unicode handling
//!   (`rtf` feature)
//! - **OOXML**: Word, Excel and PowerPoint packages (`ooxml` feature)
//! - **OpenDocument**: Text, spreadsheet and presentation packages (`odf`
//!   feature)
//! - **EPUB**: Spine documents in reading order (`epub` feature)
//! - **Legacy Word**: Word 97-2003 documents in OLE2 compound files (`ole`
//!   feature)
//! - **Plain text**: BOM-aware decoding with a configurable policy for
//!   invalid UTF-8
//!
//! Every failure is reported as an [`Error`]; malformed input never panics
//! and the library keeps no global state.
//!
//! # Example - Extracting text
//!
//! ```
//! use textractor::{Error, extract_text};
//!
//! assert_eq!(extract_text(b"Hello, World!").unwrap(), "Hello, World!");
//! assert_eq!(extract_text(b"").unwrap(), "");
//!
//! let rtf = br"{\rtf1\ansi Hello {\b RTF}\par}";
//! assert_eq!(extract_text(rtf).unwrap(), "Hello RTF");
//!
//! // A PDF header followed by garbage
//! assert!(matches!(
//!     extract_text(b"%PDF-1.7\n1 0 obj\n<<"),
//!     Err(Error::MalformedDocument { .. })
//! ));
//! ```
//!
//! # Example - Configured extractor
//!
//! ```
//! use textractor::{Extractor, ExtractOptions, TextFallback};
//!
//! let options = ExtractOptions::new()
//!     .with_max_input_size(16 * 1024 * 1024)
//!     .with_text_fallback(TextFallback::Codepage(1252));
//! let extractor = Extractor::new(options);
//!
//! assert_eq!(extractor.extract(b"caf\xE9").unwrap(), "caf\u{e9}");
//! ```

use std::path::Path;

/// Shared infrastructure: format detection, errors, encodings, containers
pub mod common;

/// Options, the decoder trait and the dispatcher
pub mod extract;

/// Plain text decoding
pub mod text;

/// PDF text extraction
#[cfg(feature = "pdf")]
pub mod pdf;

/// RTF text extraction
#[cfg(feature = "rtf")]
pub mod rtf;

/// OOXML (Office Open XML) text extraction
#[cfg(feature = "ooxml")]
pub mod ooxml;

/// OpenDocument text extraction
#[cfg(feature = "odf")]
pub mod odf;

/// EPUB text extraction
#[cfg(feature = "epub")]
pub mod epub;

/// OLE2 compound files and legacy Word documents
pub mod ole;

// Re-export commonly used types for convenience
pub use common::detection::{detect_format, sniff};
pub use common::{Error, FormatTag, Result};
pub use extract::{DecodeContext, Decoder, ExtractOptions, Extractor, TextFallback};

/// Extract the text of `input` with default options.
///
/// # Examples
///
/// ```
/// let text = textractor::extract_text("plain UTF-8 ✓".as_bytes()).unwrap();
/// assert_eq!(text, "plain UTF-8 ✓");
/// ```
pub fn extract_text(input: &[u8]) -> Result<String> {
    Extractor::default().extract(input)
}

/// Extract the text of `input` with the given options.
pub fn extract_text_with(input: &[u8], options: &ExtractOptions) -> Result<String> {
    Extractor::new(options.clone()).extract(input)
}

/// Extract the text of `input`, returning an empty string on any failure.
///
/// # Examples
///
/// ```
/// assert_eq!(textractor::extract_text_lossy(b"{\\rtf1 unterminated"), "");
/// assert_eq!(textractor::extract_text_lossy(b"fine"), "fine");
/// ```
pub fn extract_text_lossy(input: &[u8]) -> String {
    extract_text(input).unwrap_or_else(|e| {
        tracing::debug!(error = %e, "extraction failed, returning empty text");
        String::new()
    })
}

/// Read the file at `path` and extract its text with default options.
///
/// The file name plays no part in format detection. Files larger than the
/// default input size limit are rejected before they are read.
pub fn extract_file(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let extractor = Extractor::default();
    let limit = extractor.options().max_input_size;
    if std::fs::metadata(path)?.len() > limit as u64 {
        return Err(Error::limit("input size", limit));
    }

    let data = std::fs::read(path)?;
    extractor.extract(&data)
}
