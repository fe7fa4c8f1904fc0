//! Core format detection functions.
//!
//! Detection runs in two stages. [`sniff`] classifies a buffer from a
//! bounded prefix and never fails. [`probe`] looks inside ZIP and OLE2
//! containers the sniffer could not resolve from their first bytes.

use super::types::FormatTag;
use super::utils::{
    MIN_SNIFF_LEN, OLE2_SIGNATURE, SNIFF_WINDOW, ZIP_EMPTY_SIGNATURE, ZIP_SIGNATURE,
    has_signature, sniff_window,
};
use super::{ole2, pdf, rtf, text, zip};
use crate::common::Result;
use crate::extract::ExtractOptions;

/// Classify a buffer from its leading bytes.
///
/// At most [`SNIFF_WINDOW`] bytes are inspected, so the cost does not depend
/// on the size of the buffer. Buffers shorter than [`MIN_SNIFF_LEN`] bytes
/// are [`FormatTag::Unknown`].
///
/// # Examples
///
/// ```rust
/// use textractor::{FormatTag, sniff};
///
/// assert_eq!(sniff(b"%PDF-1.7\n..."), FormatTag::Pdf);
/// assert_eq!(sniff(br"{\rtf1\ansi Hello}"), FormatTag::Rtf);
/// assert_eq!(sniff(b"Hello, World!"), FormatTag::PlainText);
/// assert_eq!(sniff(b""), FormatTag::Unknown);
/// assert_eq!(sniff(b"\x00\x01\x02\x03\x04"), FormatTag::Unknown);
/// ```
pub fn sniff(bytes: &[u8]) -> FormatTag {
    if bytes.len() < MIN_SNIFF_LEN {
        return FormatTag::Unknown;
    }
    let window = sniff_window(bytes);

    if has_signature(window, OLE2_SIGNATURE) {
        return FormatTag::OleCompound;
    }
    if has_signature(window, ZIP_SIGNATURE) {
        return zip::detect_from_local_header(window);
    }
    if has_signature(window, ZIP_EMPTY_SIGNATURE) {
        return FormatTag::ZipContainer;
    }

    pdf::detect_pdf_format(window)
        .or_else(|| rtf::detect_rtf_format(window))
        .or_else(|| text::detect_text_format(window, bytes.len() > SNIFF_WINDOW))
        .unwrap_or(FormatTag::Unknown)
}

/// Resolve a container tag produced by [`sniff`] to a document type.
///
/// Tags that are not containers are returned unchanged. A container that
/// cannot be opened is reported as `MalformedDocument`.
pub fn probe(data: &[u8], tag: FormatTag, options: &ExtractOptions) -> Result<FormatTag> {
    match tag {
        FormatTag::ZipContainer => zip::probe_zip(data, options),
        FormatTag::OleCompound => ole2::probe_ole2(data, options),
        other => Ok(other),
    }
}

/// Detect the format of a buffer, looking inside containers.
///
/// Falls back to the sniffed tag when the container cannot be read.
///
/// # Examples
///
/// ```rust
/// use textractor::{FormatTag, detect_format};
///
/// assert_eq!(detect_format(b"plain words"), FormatTag::PlainText);
/// // A ZIP signature followed by garbage stays a ZIP container
/// assert_eq!(detect_format(b"PK\x03\x04garbage"), FormatTag::ZipContainer);
/// ```
pub fn detect_format(bytes: &[u8]) -> FormatTag {
    detect_format_with(bytes, &ExtractOptions::default())
}

/// [`detect_format`] with explicit limits for the container probe.
pub fn detect_format_with(bytes: &[u8], options: &ExtractOptions) -> FormatTag {
    let tag = sniff(bytes);
    probe(bytes, tag, options).unwrap_or(tag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ole::test_support::build_compound_file;

    #[test]
    fn test_sniff_signatures() {
        assert_eq!(sniff(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n"), FormatTag::Pdf);
        assert_eq!(sniff(b"{\\rtf1 hi}"), FormatTag::Rtf);
        assert_eq!(sniff(b"PK\x05\x06\0\0\0\0"), FormatTag::ZipContainer);
        assert_eq!(sniff(b"PK\x03\x04"), FormatTag::ZipContainer);
        assert_eq!(sniff(OLE2_SIGNATURE), FormatTag::OleCompound);
    }

    #[test]
    fn test_sniff_short_and_empty() {
        assert_eq!(sniff(b""), FormatTag::Unknown);
        assert_eq!(sniff(b"abc"), FormatTag::Unknown);
        assert_eq!(sniff(b"abcd"), FormatTag::PlainText);
    }

    #[test]
    fn test_sniff_is_prefix_bounded() {
        // Binary content after the window does not change the verdict
        let mut data = vec![b'a'; SNIFF_WINDOW];
        data.extend_from_slice(&[0u8; 64]);
        assert_eq!(sniff(&data), FormatTag::PlainText);

        let mut data = b"%PDF-1.7".to_vec();
        data.extend(std::iter::repeat_n(0u8, 1 << 20));
        assert_eq!(sniff(&data), FormatTag::Pdf);
    }

    #[test]
    fn test_pdf_signature_only_at_start() {
        assert_eq!(sniff(b"see %PDF-1.4 for details"), FormatTag::PlainText);
    }

    #[test]
    fn test_probe_resolves_ole2() {
        let data = build_compound_file(&[("WordDocument", b"x".as_slice())]);
        assert_eq!(sniff(&data), FormatTag::OleCompound);
        assert_eq!(detect_format(&data), FormatTag::Doc);
    }

    #[test]
    fn test_probe_leaves_other_tags() {
        let options = ExtractOptions::default();
        assert_eq!(
            probe(b"anything", FormatTag::Rtf, &options).unwrap(),
            FormatTag::Rtf
        );
        assert!(probe(b"PK\x03\x04", FormatTag::ZipContainer, &options).is_err());
    }
}
