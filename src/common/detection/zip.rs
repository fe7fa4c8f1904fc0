//! ZIP container detection.
//!
//! Sniffing only sees the first local file header, which is enough for
//! OpenDocument and EPUB (their stored `mimetype` entry comes first) and for
//! OOXML packages written with a part directory first. Everything else is
//! resolved by [`probe_zip`], which reads the central directory.

use super::types::FormatTag;
use super::{odf, ooxml};
use crate::common::Result;
use crate::common::archive::ZipPackage;
use crate::common::binary::{read_u16_le, read_u32_le};
use crate::extract::{DecodeContext, ExtractOptions};

/// Size of the fixed part of a local file header
const LOCAL_HEADER_SIZE: usize = 30;
const METHOD_STORED: u16 = 0;

/// Classify a ZIP archive from the local header of its first entry.
///
/// `window` is the bounded sniffing prefix and must start with a local file
/// header signature.
pub fn detect_from_local_header(window: &[u8]) -> FormatTag {
    first_entry_format(window).unwrap_or(FormatTag::ZipContainer)
}

fn first_entry_format(window: &[u8]) -> Option<FormatTag> {
    let method = read_u16_le(window, 8).ok()?;
    let compressed_size = read_u32_le(window, 18).ok()? as usize;
    let name_len = read_u16_le(window, 26).ok()? as usize;
    let extra_len = read_u16_le(window, 28).ok()? as usize;

    let name = window.get(LOCAL_HEADER_SIZE..LOCAL_HEADER_SIZE + name_len)?;
    if name == b"mimetype" && method == METHOD_STORED {
        let start = LOCAL_HEADER_SIZE + name_len + extra_len;
        let content = window.get(start..start.checked_add(compressed_size)?)?;
        return odf::detect_from_mimetype(content);
    }

    ooxml::detect_from_first_entry(name)
}

/// Resolve the document type of a ZIP archive from its central directory.
///
/// A `mimetype` entry wins, then the main part content type declared in
/// `[Content_Types].xml`, then well-known part names. Archives matching none
/// of these stay [`FormatTag::ZipContainer`].
pub fn probe_zip(data: &[u8], options: &ExtractOptions) -> Result<FormatTag> {
    let ctx = DecodeContext::new(options, FormatTag::ZipContainer);
    let mut package = ZipPackage::open(data, &ctx)?;

    if let Some(mimetype) = package.read_optional_part("mimetype", &ctx)?
        && let Some(format) = odf::detect_from_mimetype(&mimetype)
    {
        return Ok(format);
    }

    if let Some(content_types) = package.read_optional_part("[Content_Types].xml", &ctx)?
        && let Some(format) = ooxml::detect_from_content_types(&content_types)
    {
        return Ok(format);
    }

    Ok(ooxml::detect_from_part_names(|name| package.has_part(name))
        .unwrap_or(FormatTag::ZipContainer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use ::zip::CompressionMethod;
    use ::zip::write::{SimpleFileOptions, ZipWriter};

    fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in entries {
            let options = if *name == "mimetype" {
                SimpleFileOptions::default().compression_method(CompressionMethod::Stored)
            } else {
                SimpleFileOptions::default()
            };
            writer.start_file(*name, options).unwrap();
            writer.write_all(content).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_local_header_mimetype() {
        let data = build_zip(&[
            ("mimetype", b"application/vnd.oasis.opendocument.spreadsheet"),
            ("content.xml", b"<x/>"),
        ]);
        assert_eq!(detect_from_local_header(&data), FormatTag::Ods);
    }

    #[test]
    fn test_local_header_first_part() {
        let data = build_zip(&[("ppt/presentation.xml", b"<p/>")]);
        assert_eq!(detect_from_local_header(&data), FormatTag::Pptx);

        let data = build_zip(&[("readme.txt", b"hi")]);
        assert_eq!(detect_from_local_header(&data), FormatTag::ZipContainer);
    }

    #[test]
    fn test_local_header_truncated() {
        let data = build_zip(&[("mimetype", b"application/epub+zip")]);
        assert_eq!(detect_from_local_header(&data[..12]), FormatTag::ZipContainer);
    }

    #[test]
    fn test_probe_content_types() {
        let content_types = br#"<Types><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/></Types>"#;
        let data = build_zip(&[
            ("[Content_Types].xml", content_types),
            ("xl/workbook.xml", b"<workbook/>"),
        ]);
        let options = ExtractOptions::default();
        assert_eq!(probe_zip(&data, &options).unwrap(), FormatTag::Xlsx);
    }

    #[test]
    fn test_probe_part_names_and_generic_zip() {
        let options = ExtractOptions::default();
        let data = build_zip(&[("word/document.xml", b"<w:document/>")]);
        assert_eq!(probe_zip(&data, &options).unwrap(), FormatTag::Docx);

        let data = build_zip(&[("notes.txt", b"just a zip")]);
        assert_eq!(probe_zip(&data, &options).unwrap(), FormatTag::ZipContainer);
    }

    #[test]
    fn test_probe_broken_archive() {
        let options = ExtractOptions::default();
        let data = build_zip(&[("notes.txt", b"just a zip")]);
        assert!(probe_zip(&data[..20], &options).unwrap_err().is_malformed());
    }
}
