//! Configuration types for extraction.
//!
//! This module defines the limits and policies an [`Extractor`](super::Extractor)
//! applies to every buffer it decodes.

use serde::{Deserialize, Serialize};

/// What to do with plain text that is not valid UTF-8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextFallback {
    /// Replace invalid sequences with U+FFFD
    #[default]
    Replace,
    /// Decode the whole buffer with the given Windows codepage instead
    Codepage(u32),
    /// Fail with [`Error::Encoding`](crate::Error::Encoding)
    Reject,
}

/// Limits and policies for extraction.
///
/// Every limit bounds the work done for one buffer, so an adversarial
/// document fails with [`Error::LimitExceeded`](crate::Error::LimitExceeded)
/// instead of exhausting memory.
///
/// # Examples
///
/// ```rust
/// use textractor::{ExtractOptions, TextFallback};
///
/// // Create with defaults
/// let options = ExtractOptions::default();
///
/// // Or customize
/// let options = ExtractOptions::new()
///     .with_max_input_size(8 * 1024 * 1024)
///     .with_text_fallback(TextFallback::Reject);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractOptions {
    /// Largest input buffer accepted, in bytes
    pub max_input_size: usize,
    /// Largest decompressed size of a single ZIP entry or OLE stream
    pub max_part_size: usize,
    /// Largest total decompressed size per extraction call
    pub max_total_inflated: usize,
    /// Deepest RTF group or XML element nesting accepted
    pub max_nesting_depth: usize,
    /// Most entries accepted in a ZIP archive
    pub max_entries: usize,
    /// Handling of invalid UTF-8 in plain text
    pub text_fallback: TextFallback,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            max_input_size: 256 * 1024 * 1024,
            max_part_size: 64 * 1024 * 1024,
            max_total_inflated: 512 * 1024 * 1024,
            max_nesting_depth: 512,
            max_entries: 65_536,
            text_fallback: TextFallback::Replace,
        }
    }
}

impl ExtractOptions {
    /// Create a new `ExtractOptions` with default values.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the largest input buffer accepted, in bytes.
    #[inline]
    pub fn with_max_input_size(mut self, bytes: usize) -> Self {
        self.max_input_size = bytes;
        self
    }

    /// Set the largest decompressed size of a single archive part.
    #[inline]
    pub fn with_max_part_size(mut self, bytes: usize) -> Self {
        self.max_part_size = bytes;
        self
    }

    /// Set the total decompression budget of one extraction call.
    #[inline]
    pub fn with_max_total_inflated(mut self, bytes: usize) -> Self {
        self.max_total_inflated = bytes;
        self
    }

    /// Set the deepest nesting accepted in RTF groups and XML elements.
    #[inline]
    pub fn with_max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth;
        self
    }

    /// Set the most entries accepted in a ZIP archive.
    #[inline]
    pub fn with_max_entries(mut self, entries: usize) -> Self {
        self.max_entries = entries;
        self
    }

    /// Set how invalid UTF-8 in plain text is handled.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use textractor::{ExtractOptions, TextFallback};
    ///
    /// let options = ExtractOptions::new().with_text_fallback(TextFallback::Codepage(1252));
    /// assert_eq!(textractor::extract_text_with(b"caf\xE9", &options).unwrap(), "café");
    /// ```
    #[inline]
    pub fn with_text_fallback(mut self, fallback: TextFallback) -> Self {
        self.text_fallback = fallback;
        self
    }
}
