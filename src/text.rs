//! Plain text decoding.
//!
//! Valid UTF-8 is returned byte for byte. A byte order mark selects UTF-16 or
//! UTF-32 and is dropped from the output. Anything else is handled by the
//! [`TextFallback`] policy of the extractor.

use crate::common::bom::{BomKind, strip_bom};
use crate::common::encoding::{decode_codepage, decode_utf16, decode_utf32};
use crate::common::{Error, Result};
use crate::extract::{DecodeContext, Decoder, TextFallback};

/// Decoder for plain text, also used as the best-effort path for buffers
/// the sniffer does not recognize.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextDecoder;

impl Decoder for PlainTextDecoder {
    fn decode(&self, input: &[u8], ctx: &DecodeContext<'_>) -> Result<String> {
        decode_text(input, ctx.options().text_fallback)
    }
}

/// Decode a text buffer according to its byte order mark and `fallback`.
///
/// # Examples
///
/// ```rust
/// use textractor::TextFallback;
/// use textractor::text::decode_text;
///
/// assert_eq!(decode_text(b"plain", TextFallback::Replace).unwrap(), "plain");
/// assert_eq!(decode_text(b"\xFF\xFEh\0i\0", TextFallback::Replace).unwrap(), "hi");
/// assert_eq!(decode_text(b"bad \xFF", TextFallback::Replace).unwrap(), "bad \u{FFFD}");
/// assert!(decode_text(b"bad \xFF", TextFallback::Reject).is_err());
/// ```
pub fn decode_text(input: &[u8], fallback: TextFallback) -> Result<String> {
    let strict = fallback == TextFallback::Reject;
    let (bom, body) = strip_bom(input);

    match bom {
        Some(BomKind::Utf16Le) => decode_utf16(body, false, strict).map_err(Error::Encoding),
        Some(BomKind::Utf16Be) => decode_utf16(body, true, strict).map_err(Error::Encoding),
        Some(BomKind::Utf32Le) => decode_utf32(body, false, strict).map_err(Error::Encoding),
        Some(BomKind::Utf32Be) => decode_utf32(body, true, strict).map_err(Error::Encoding),
        Some(BomKind::Utf8) | None => decode_utf8(body, fallback),
    }
}

fn decode_utf8(bytes: &[u8], fallback: TextFallback) -> Result<String> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Ok(text.to_owned()),
        Err(e) => match fallback {
            TextFallback::Replace => Ok(String::from_utf8_lossy(bytes).into_owned()),
            TextFallback::Codepage(codepage) => decode_codepage(bytes, codepage)
                .ok_or_else(|| Error::Encoding(format!("unknown codepage {}", codepage))),
            TextFallback::Reject => Err(Error::Encoding(format!(
                "invalid UTF-8 at byte {}",
                e.valid_up_to()
            ))),
        },
    }
}
