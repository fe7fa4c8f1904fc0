//! Format tag enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of a document's container format.
///
/// Produced by [`sniff`](super::sniff) from the leading bytes of a buffer and
/// refined by [`probe`](super::probe) for container formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormatTag {
    /// Plain text (UTF-8, or any encoding announced by a byte order mark)
    PlainText,
    /// Portable Document Format
    Pdf,
    /// Rich Text Format
    Rtf,
    /// ZIP archive whose document type is not known yet, or a generic archive
    ZipContainer,
    /// Word document (OOXML, .docx/.docm/.dotx)
    Docx,
    /// Excel workbook (OOXML, .xlsx/.xlsm/.xltx)
    Xlsx,
    /// Excel binary workbook (.xlsb)
    Xlsb,
    /// PowerPoint presentation (OOXML, .pptx/.pptm/.ppsx)
    Pptx,
    /// OpenDocument Text (.odt)
    Odt,
    /// OpenDocument Spreadsheet (.ods)
    Ods,
    /// OpenDocument Presentation (.odp)
    Odp,
    /// EPUB e-book
    Epub,
    /// OLE2 compound file whose document type is not known yet
    OleCompound,
    /// Word 97-2003 document (.doc)
    Doc,
    /// Excel 97-2003 workbook (.xls)
    Xls,
    /// PowerPoint 97-2003 presentation (.ppt)
    Ppt,
    /// Nothing recognizable
    Unknown,
}

impl FormatTag {
    /// Short human-readable name of the format.
    pub const fn name(&self) -> &'static str {
        match self {
            FormatTag::PlainText => "plain text",
            FormatTag::Pdf => "PDF",
            FormatTag::Rtf => "RTF",
            FormatTag::ZipContainer => "ZIP",
            FormatTag::Docx => "DOCX",
            FormatTag::Xlsx => "XLSX",
            FormatTag::Xlsb => "XLSB",
            FormatTag::Pptx => "PPTX",
            FormatTag::Odt => "ODT",
            FormatTag::Ods => "ODS",
            FormatTag::Odp => "ODP",
            FormatTag::Epub => "EPUB",
            FormatTag::OleCompound => "OLE2",
            FormatTag::Doc => "DOC",
            FormatTag::Xls => "XLS",
            FormatTag::Ppt => "PPT",
            FormatTag::Unknown => "unknown",
        }
    }

    /// IANA media type of the format.
    pub const fn mime_type(&self) -> &'static str {
        match self {
            FormatTag::PlainText => "text/plain",
            FormatTag::Pdf => "application/pdf",
            FormatTag::Rtf => "application/rtf",
            FormatTag::ZipContainer => "application/zip",
            FormatTag::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            },
            FormatTag::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            FormatTag::Xlsb => "application/vnd.ms-excel.sheet.binary.macroEnabled.12",
            FormatTag::Pptx => {
                "application/vnd.openxmlformats-officedocument.presentationml.presentation"
            },
            FormatTag::Odt => "application/vnd.oasis.opendocument.text",
            FormatTag::Ods => "application/vnd.oasis.opendocument.spreadsheet",
            FormatTag::Odp => "application/vnd.oasis.opendocument.presentation",
            FormatTag::Epub => "application/epub+zip",
            FormatTag::OleCompound => "application/x-ole-storage",
            FormatTag::Doc => "application/msword",
            FormatTag::Xls => "application/vnd.ms-excel",
            FormatTag::Ppt => "application/vnd.ms-powerpoint",
            FormatTag::Unknown => "application/octet-stream",
        }
    }

    /// Whether the tag names a container that still has to be probed.
    #[inline]
    pub const fn is_container(&self) -> bool {
        matches!(self, FormatTag::ZipContainer | FormatTag::OleCompound)
    }
}

impl fmt::Display for FormatTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_uses_name() {
        assert_eq!(FormatTag::Docx.to_string(), "DOCX");
        assert_eq!(FormatTag::PlainText.to_string(), "plain text");
    }

    #[test]
    fn test_containers() {
        assert!(FormatTag::ZipContainer.is_container());
        assert!(FormatTag::OleCompound.is_container());
        assert!(!FormatTag::Docx.is_container());
        assert!(!FormatTag::Unknown.is_container());
    }
}
