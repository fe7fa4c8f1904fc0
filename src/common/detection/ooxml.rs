//! OOXML format detection (modern Office documents).
//!
//! The document type of an OPC package is the content type of its main part,
//! declared in `[Content_Types].xml`. Packages without that file are
//! recognized by their well-known main part names.

use super::types::FormatTag;
use memchr::memmem;

/// Main-part content types, most specific first.
const MAIN_CONTENT_TYPES: &[(&[u8], FormatTag)] = &[
    (b"ms-excel.sheet.binary.macroEnabled.main", FormatTag::Xlsb),
    (b"wordprocessingml.document.main", FormatTag::Docx),
    (b"wordprocessingml.template.main", FormatTag::Docx),
    (b"ms-word.document.macroEnabled.main", FormatTag::Docx),
    (b"ms-word.template.macroEnabledTemplate.main", FormatTag::Docx),
    (b"spreadsheetml.sheet.main", FormatTag::Xlsx),
    (b"spreadsheetml.template.main", FormatTag::Xlsx),
    (b"ms-excel.sheet.macroEnabled.main", FormatTag::Xlsx),
    (b"ms-excel.template.macroEnabled.main", FormatTag::Xlsx),
    (b"presentationml.presentation.main", FormatTag::Pptx),
    (b"presentationml.slideshow.main", FormatTag::Pptx),
    (b"presentationml.template.main", FormatTag::Pptx),
    (b"ms-powerpoint.presentation.macroEnabled.main", FormatTag::Pptx),
    (b"ms-powerpoint.slideshow.macroEnabled.main", FormatTag::Pptx),
    (b"ms-powerpoint.template.macroEnabled.main", FormatTag::Pptx),
];

/// Well-known part names, checked when no content types are declared.
const MAIN_PART_NAMES: &[(&str, FormatTag)] = &[
    ("word/document.xml", FormatTag::Docx),
    ("xl/workbook.xml", FormatTag::Xlsx),
    ("xl/workbook.bin", FormatTag::Xlsb),
    ("ppt/presentation.xml", FormatTag::Pptx),
    ("META-INF/container.xml", FormatTag::Epub),
];

/// Detect the OOXML flavour from the bytes of `[Content_Types].xml`.
///
/// Embedded packages appear with their package content type (no `.main`
/// suffix), so they do not confuse the detection.
///
/// # Examples
///
/// ```rust
/// use textractor::common::detection::ooxml::detect_from_content_types;
/// use textractor::FormatTag;
///
/// let xml = br#"<Types><Override PartName="/word/document.xml"
///   ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;
/// assert_eq!(detect_from_content_types(xml), Some(FormatTag::Docx));
/// ```
pub fn detect_from_content_types(content_types: &[u8]) -> Option<FormatTag> {
    MAIN_CONTENT_TYPES
        .iter()
        .find(|(needle, _)| memmem::find(content_types, needle).is_some())
        .map(|(_, format)| *format)
}

/// Detect the package format from its entry names.
pub fn detect_from_part_names(mut has_part: impl FnMut(&str) -> bool) -> Option<FormatTag> {
    MAIN_PART_NAMES
        .iter()
        .find(|(name, _)| has_part(name))
        .map(|(_, format)| *format)
}

/// Guess the package format from the first entry name of an archive.
#[inline]
pub fn detect_from_first_entry(name: &[u8]) -> Option<FormatTag> {
    if name.starts_with(b"word/") {
        Some(FormatTag::Docx)
    } else if name.starts_with(b"xl/") {
        Some(FormatTag::Xlsx)
    } else if name.starts_with(b"ppt/") {
        Some(FormatTag::Pptx)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_types() {
        let xlsx = br#"<Override ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#;
        assert_eq!(detect_from_content_types(xlsx), Some(FormatTag::Xlsx));

        let pptm = br#"<Override ContentType="application/vnd.ms-powerpoint.presentation.macroEnabled.main+xml"/>"#;
        assert_eq!(detect_from_content_types(pptm), Some(FormatTag::Pptx));

        let xlsb = br#"<Override ContentType="application/vnd.ms-excel.sheet.binary.macroEnabled.main"/>"#;
        assert_eq!(detect_from_content_types(xlsb), Some(FormatTag::Xlsb));
    }

    #[test]
    fn test_embedded_package_does_not_count() {
        let docx_with_chart = br#"<Types>
            <Default Extension="xlsx" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"/>
            <Override ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
        </Types>"#;
        assert_eq!(detect_from_content_types(docx_with_chart), Some(FormatTag::Docx));
        assert_eq!(detect_from_content_types(b"<Types/>"), None);
    }

    #[test]
    fn test_part_names() {
        let names = ["[Content_Types].xml", "ppt/presentation.xml"];
        assert_eq!(
            detect_from_part_names(|name| names.contains(&name)),
            Some(FormatTag::Pptx)
        );
        assert_eq!(detect_from_part_names(|_| false), None);
    }

    #[test]
    fn test_first_entry() {
        assert_eq!(detect_from_first_entry(b"word/document.xml"), Some(FormatTag::Docx));
        assert_eq!(detect_from_first_entry(b"[Content_Types].xml"), None);
    }
}
