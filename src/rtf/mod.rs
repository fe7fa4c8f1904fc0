//! RTF (Rich Text Format) text extraction.
//!
//! The document is tokenized by a byte-level [`lexer`] and folded into text
//! by a group-stack [`parser`] in a single pass.
//!
//! # Example
//!
//! ```rust
//! use textractor::rtf::rtf_to_text;
//!
//! let rtf = br"{\rtf1\ansi{\fonttbl\f0\fswiss Helvetica;}\f0\pard Hello World!\par}";
//! assert_eq!(rtf_to_text(rtf, 64).unwrap(), "Hello World!");
//! ```

mod error;
mod lexer;
mod parser;

pub use error::{RtfError, RtfResult};

use crate::common::Result;
use crate::extract::{DecodeContext, Decoder};
use parser::Parser;

/// Decoder for RTF documents.
#[derive(Debug, Default, Clone, Copy)]
pub struct RtfDecoder;

impl Decoder for RtfDecoder {
    fn decode(&self, input: &[u8], ctx: &DecodeContext<'_>) -> Result<String> {
        Ok(rtf_to_text(input, ctx.options().max_nesting_depth)?)
    }
}

/// Extract the text of an RTF document, rejecting groups nested deeper
/// than `max_depth`.
pub fn rtf_to_text(input: &[u8], max_depth: usize) -> RtfResult<String> {
    Parser::new(input, max_depth).parse()
}
