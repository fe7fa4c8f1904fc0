//! Mimetype-based detection for OpenDocument and EPUB packages.
//!
//! Both formats store their media type uncompressed in a `mimetype` entry,
//! which is required to be the first entry of the archive.

use super::types::FormatTag;
use phf::phf_map;

/// Media types announced by a `mimetype` entry.
static MIMETYPES: phf::Map<&'static str, FormatTag> = phf_map! {
    "application/vnd.oasis.opendocument.text" => FormatTag::Odt,
    "application/vnd.oasis.opendocument.text-template" => FormatTag::Odt,
    "application/vnd.oasis.opendocument.text-master" => FormatTag::Odt,
    "application/vnd.oasis.opendocument.spreadsheet" => FormatTag::Ods,
    "application/vnd.oasis.opendocument.spreadsheet-template" => FormatTag::Ods,
    "application/vnd.oasis.opendocument.presentation" => FormatTag::Odp,
    "application/vnd.oasis.opendocument.presentation-template" => FormatTag::Odp,
    "application/epub+zip" => FormatTag::Epub,
};

/// Detect the package format from the content of a `mimetype` entry.
///
/// # Examples
///
/// ```rust
/// use textractor::common::detection::odf::detect_from_mimetype;
/// use textractor::FormatTag;
///
/// assert_eq!(
///     detect_from_mimetype(b"application/vnd.oasis.opendocument.text"),
///     Some(FormatTag::Odt)
/// );
/// assert_eq!(detect_from_mimetype(b"application/epub+zip\n"), Some(FormatTag::Epub));
/// assert_eq!(detect_from_mimetype(b"text/plain"), None);
/// ```
pub fn detect_from_mimetype(mimetype: &[u8]) -> Option<FormatTag> {
    let mime = std::str::from_utf8(mimetype).ok()?;
    MIMETYPES.get(mime.trim()).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_map_to_base_format() {
        assert_eq!(
            detect_from_mimetype(b"application/vnd.oasis.opendocument.spreadsheet-template"),
            Some(FormatTag::Ods)
        );
        assert_eq!(
            detect_from_mimetype(b"application/vnd.oasis.opendocument.presentation"),
            Some(FormatTag::Odp)
        );
    }

    #[test]
    fn test_unknown_mimetypes() {
        assert_eq!(detect_from_mimetype(b"application/vnd.oasis.opendocument.graphics"), None);
        assert_eq!(detect_from_mimetype(b"\xff\xfe"), None);
    }
}
