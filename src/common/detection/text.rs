//! Plain text detection.
//!
//! Text has no signature, so it is recognized by what it lacks: a byte order
//! mark announces it outright, otherwise the prefix must be UTF-8 without the
//! C0 control bytes that never occur in human-written text.

use super::types::FormatTag;
use crate::common::bom::detect_bom;

/// Whether `byte` is a control byte that marks binary content.
///
/// Tab, line feed, vertical tab, form feed, carriage return and escape are
/// allowed.
#[inline]
fn is_binary_control(byte: u8) -> bool {
    matches!(byte, 0x00..=0x08 | 0x0E..=0x1A | 0x1C..=0x1F | 0x7F)
}

/// Detect plain text in a bounded prefix.
///
/// `truncated` tells whether `prefix` was cut from a longer buffer, in which
/// case a multi-byte UTF-8 sequence split by the cut is accepted.
pub fn detect_text_format(prefix: &[u8], truncated: bool) -> Option<FormatTag> {
    if detect_bom(prefix).is_some() {
        return Some(FormatTag::PlainText);
    }

    if prefix.iter().copied().any(is_binary_control) {
        return None;
    }

    match std::str::from_utf8(prefix) {
        Ok(_) => Some(FormatTag::PlainText),
        // `error_len() == None` means the input ended inside a sequence
        Err(e) if truncated && e.error_len().is_none() => Some(FormatTag::PlainText),
        Err(_) => None,
    }
}
