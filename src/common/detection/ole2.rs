//! OLE2 (legacy Office binary) container detection.
//!
//! All legacy Office files share the compound file signature; the document
//! type is told apart by the streams the root storage holds.

use super::types::FormatTag;
use crate::common::{Error, Result};
use crate::extract::ExtractOptions;
use crate::ole::OleFile;

/// Root streams that identify each application, checked in order.
const MAIN_STREAMS: &[(&str, FormatTag)] = &[
    ("WordDocument", FormatTag::Doc),
    ("PowerPoint Document", FormatTag::Ppt),
    ("Workbook", FormatTag::Xls),
    // Excel 5.0/95
    ("Book", FormatTag::Xls),
];

/// Resolve the document type of a compound file from its directory.
///
/// OOXML documents encrypted with a password are stored as compound files
/// holding `EncryptionInfo` and `EncryptedPackage`; they are reported as
/// [`Error::Encrypted`].
pub fn probe_ole2(data: &[u8], options: &ExtractOptions) -> Result<FormatTag> {
    let ole = OleFile::open(data, options.max_part_size)?;

    if ole.exists(&["EncryptionInfo"]) && ole.exists(&["EncryptedPackage"]) {
        return Err(Error::Encrypted(FormatTag::OleCompound));
    }

    Ok(MAIN_STREAMS
        .iter()
        .find(|(stream, _)| ole.exists(&[*stream]))
        .map(|(_, format)| *format)
        .unwrap_or(FormatTag::OleCompound))
}
