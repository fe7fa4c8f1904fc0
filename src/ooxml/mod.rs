//! Office Open XML (OOXML) text extraction.
//!
//! Word, Excel and PowerPoint documents are Open Packaging Conventions
//! packages: a ZIP archive whose parts are linked by relationship parts.
//! The decoders locate the main part through the package relationships,
//! then stream the XML of each story, sheet or slide into text.
//!
//! # Example
//!
//! ```rust,no_run
//! use textractor::{DecodeContext, Decoder, ExtractOptions, FormatTag};
//! use textractor::ooxml::DocxDecoder;
//!
//! let data = std::fs::read("report.docx")?;
//! let options = ExtractOptions::default();
//! let ctx = DecodeContext::new(&options, FormatTag::Docx);
//! println!("{}", DocxDecoder.decode(&data, &ctx)?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod docx;
mod package;
mod pptx;
pub mod rels;
mod xlsx;

pub use docx::DocxDecoder;
pub use pptx::PptxDecoder;
pub use xlsx::XlsxDecoder;

#[cfg(test)]
pub(crate) use docx::tests::build_docx;
