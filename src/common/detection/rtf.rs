//! RTF signature check.
//!
//! Every RTF document opens its outermost group with the `\rtf` control
//! word, so the first five bytes decide. The version number that follows
//! is not inspected.

use super::types::FormatTag;
use super::utils::has_signature;

const RTF_SIGNATURE: &[u8] = b"{\\rtf";

/// Detect an RTF document from its leading bytes.
///
/// # Examples
///
/// ```rust
/// use textractor::FormatTag;
/// use textractor::common::detection::rtf::detect_rtf_format;
///
/// assert_eq!(detect_rtf_format(br"{\rtf1\ansi Hi}"), Some(FormatTag::Rtf));
/// assert_eq!(detect_rtf_format(b"{ \"json\": true }"), None);
/// ```
#[inline]
pub fn detect_rtf_format(bytes: &[u8]) -> Option<FormatTag> {
    has_signature(bytes, RTF_SIGNATURE).then_some(FormatTag::Rtf)
}
