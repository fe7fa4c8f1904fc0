//! The decoder capability and the per-call state handed to it.

use super::config::ExtractOptions;
use crate::common::detection::FormatTag;
use crate::common::{Error, Result};
use std::cell::Cell;

/// A decoder turns the bytes of one recognized format into plain text.
///
/// Implementations must be total over malformed input: truncated or corrupt
/// structures are reported as an [`Error`], never as a panic. Decoders hold no
/// mutable state; everything a call needs lives in the [`DecodeContext`].
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use textractor::{DecodeContext, Decoder, Extractor, FormatTag, Result};
///
/// struct Shouting;
///
/// impl Decoder for Shouting {
///     fn decode(&self, input: &[u8], _ctx: &DecodeContext<'_>) -> Result<String> {
///         Ok(String::from_utf8_lossy(input).to_uppercase())
///     }
/// }
///
/// let mut extractor = Extractor::default();
/// extractor.register(FormatTag::PlainText, Arc::new(Shouting));
/// assert_eq!(extractor.extract(b"quiet").unwrap(), "QUIET");
/// ```
pub trait Decoder: Send + Sync {
    /// Decode `input` into text.
    fn decode(&self, input: &[u8], ctx: &DecodeContext<'_>) -> Result<String>;
}

/// Scratch state of a single extraction call.
///
/// Tracks the decompression budget so that the limits in
/// [`ExtractOptions`] apply to the call as a whole, not per part.
#[derive(Debug)]
pub struct DecodeContext<'a> {
    options: &'a ExtractOptions,
    format: FormatTag,
    inflated: Cell<usize>,
}

impl<'a> DecodeContext<'a> {
    /// Create the context for decoding a buffer classified as `format`.
    pub fn new(options: &'a ExtractOptions, format: FormatTag) -> Self {
        Self {
            options,
            format,
            inflated: Cell::new(0),
        }
    }

    /// The options of the extractor running this call.
    #[inline]
    pub fn options(&self) -> &ExtractOptions {
        self.options
    }

    /// The format the buffer was classified as.
    #[inline]
    pub fn format(&self) -> FormatTag {
        self.format
    }

    /// Build a [`Error::MalformedDocument`] for the current format.
    #[inline]
    pub fn malformed(&self, reason: impl Into<String>) -> Error {
        Error::malformed(self.format, reason)
    }

    /// Account for `bytes` of decompressed data against the call budget.
    pub fn charge(&self, bytes: usize) -> Result<()> {
        let limit = self.options.max_total_inflated;
        let total = self.inflated.get().saturating_add(bytes);
        if total > limit {
            return Err(Error::limit("decompressed document size", limit));
        }
        self.inflated.set(total);
        Ok(())
    }

    /// Total decompressed bytes charged so far.
    #[inline]
    pub fn inflated(&self) -> usize {
        self.inflated.get()
    }

    /// Fail if `depth` exceeds the configured nesting limit.
    #[inline]
    pub fn check_depth(&self, depth: usize) -> Result<()> {
        let limit = self.options.max_nesting_depth;
        if depth > limit {
            return Err(Error::limit("nesting depth", limit));
        }
        Ok(())
    }
}
