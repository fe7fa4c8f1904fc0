/// File Information Block (FIB) parser for DOC files.
///
/// The FIB is located at the beginning of the WordDocument stream. Only the
/// fields needed to locate the main document text are read:
/// - Bytes 0-1: wIdent (magic number, 0xA5EC for Word 97 and later)
/// - Bytes 10-11: flags (encryption, table stream selection)
/// - Bytes 0x4C-0x4F: ccpText (length of the main document in characters)
/// - Bytes 0x1A2-0x1A9: fcClx/lcbClx (location of the piece table)
use crate::common::binary::{read_u16_le, read_u32_le};
use crate::common::{Error, FormatTag, Result};

/// Magic number of Word 97 and later documents
const WORD97_IDENT: u16 = 0xA5EC;
/// Magic number of Word 6.0/95 documents
const WORD95_IDENT: u16 = 0xA5DC;

const FLAG_ENCRYPTED: u16 = 0x0100;
const FLAG_WHICH_TABLE_STREAM: u16 = 0x0200;

const OFFSET_FLAGS: usize = 0x0A;
const OFFSET_CCP_TEXT: usize = 0x4C;
const OFFSET_FC_CLX: usize = 0x1A2;
const OFFSET_LCB_CLX: usize = 0x1A6;

/// File Information Block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInformationBlock {
    flags: u16,
    ccp_text: u32,
    fc_clx: u32,
    lcb_clx: u32,
}

impl FileInformationBlock {
    /// Parse a FIB from the WordDocument stream.
    pub fn parse(word_document: &[u8]) -> Result<Self> {
        let truncated = |_| Error::malformed(FormatTag::Doc, "WordDocument stream too short for FIB");

        let magic = read_u16_le(word_document, 0).map_err(truncated)?;
        match magic {
            WORD97_IDENT => {},
            WORD95_IDENT => {
                return Err(Error::malformed(
                    FormatTag::Doc,
                    "Word 6.0/95 documents are not supported",
                ));
            },
            other => {
                return Err(Error::malformed(
                    FormatTag::Doc,
                    format!("invalid FIB magic number: 0x{:04X}", other),
                ));
            },
        }

        Ok(Self {
            flags: read_u16_le(word_document, OFFSET_FLAGS).map_err(truncated)?,
            ccp_text: read_u32_le(word_document, OFFSET_CCP_TEXT).map_err(truncated)?,
            fc_clx: read_u32_le(word_document, OFFSET_FC_CLX).map_err(truncated)?,
            lcb_clx: read_u32_le(word_document, OFFSET_LCB_CLX).map_err(truncated)?,
        })
    }

    #[inline]
    pub fn is_encrypted(&self) -> bool {
        self.flags & FLAG_ENCRYPTED != 0
    }

    /// Name of the table stream that holds the piece table.
    #[inline]
    pub fn table_stream_name(&self) -> &'static str {
        if self.flags & FLAG_WHICH_TABLE_STREAM != 0 {
            "1Table"
        } else {
            "0Table"
        }
    }

    /// Number of characters in the main document.
    #[inline]
    pub fn ccp_text(&self) -> u32 {
        self.ccp_text
    }

    /// Offset and length of the Clx in the table stream.
    #[inline]
    pub fn clx_range(&self) -> (u32, u32) {
        (self.fc_clx, self.lcb_clx)
    }
}
