//! PDF detection.

use super::types::FormatTag;
use super::utils::{PDF_SIGNATURE, has_signature};

/// Detect a PDF header (`%PDF-`) at the start of the buffer.
#[inline]
pub fn detect_pdf_format(bytes: &[u8]) -> Option<FormatTag> {
    has_signature(bytes, PDF_SIGNATURE).then_some(FormatTag::Pdf)
}
