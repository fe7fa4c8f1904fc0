//! Word 97-2003 (.doc) text extraction.
//!
//! A .doc file is an OLE2 structured storage containing several streams:
//! - **WordDocument**: the FIB followed by the document text
//! - **1Table** or **0Table**: the piece table and formatting information
//!
//! Text is assembled through the piece table rather than read from a fixed
//! offset, so fast-saved documents with out-of-order pieces come out in
//! reading order.

mod fib;
mod piece_table;
mod text;

pub use fib::FileInformationBlock;
pub use piece_table::{PieceTable, TextPiece};
pub use text::normalize;

use crate::common::{Error, FormatTag, Result};
use crate::extract::{DecodeContext, Decoder};
use crate::ole::{OleError, OleFile};
use tracing::debug;

/// Decoder for Word 97-2003 binary documents.
#[derive(Debug, Default, Clone, Copy)]
pub struct DocDecoder;

impl Decoder for DocDecoder {
    fn decode(&self, input: &[u8], ctx: &DecodeContext<'_>) -> Result<String> {
        let ole = OleFile::open(input, ctx.options().max_part_size)?;
        let word_document = read_stream(&ole, "WordDocument", ctx)?;

        let fib = FileInformationBlock::parse(&word_document)?;
        if fib.is_encrypted() {
            return Err(Error::Encrypted(FormatTag::Doc));
        }

        let table = read_stream(&ole, fib.table_stream_name(), ctx)?;

        let (fc_clx, lcb_clx) = fib.clx_range();
        let start = fc_clx as usize;
        let clx = start
            .checked_add(lcb_clx as usize)
            .and_then(|end| table.get(start..end))
            .ok_or_else(|| ctx.malformed("piece table outside the table stream"))?;

        let pieces = PieceTable::parse(clx).ok_or_else(|| ctx.malformed("invalid piece table"))?;
        debug!(
            pieces = pieces.pieces().len(),
            ccp_text = fib.ccp_text(),
            "parsed Word piece table"
        );

        let raw = pieces
            .text(&word_document, fib.ccp_text())
            .ok_or_else(|| ctx.malformed("text piece outside the WordDocument stream"))?;

        Ok(normalize(&raw))
    }
}

fn read_stream(ole: &OleFile<'_>, name: &str, ctx: &DecodeContext<'_>) -> Result<Vec<u8>> {
    ole.open_stream(&[name]).map_err(|e| match e {
        OleError::StreamTooLarge { .. } => Error::from(e),
        other => ctx.malformed(other.to_string()),
    })
}
