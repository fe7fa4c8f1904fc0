//! PDF text extraction.
//!
//! Content streams are interpreted by `pdf-extract`. Before handing the
//! buffer over, the decoder checks that the file trailer is present, so a
//! truncated download is reported as malformed instead of being parsed by
//! a recovery path that may return partial text.

use crate::common::Result;
use crate::extract::{DecodeContext, Decoder};
use memchr::memmem;
use std::panic::{self, AssertUnwindSafe};
use tracing::warn;

/// Only the tail of the file is searched for the trailer markers.
const TRAILER_WINDOW: usize = 4096;

/// Decoder for PDF documents.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfDecoder;

impl Decoder for PdfDecoder {
    fn decode(&self, input: &[u8], ctx: &DecodeContext<'_>) -> Result<String> {
        check_trailer(input, ctx)?;

        // The content stream interpreter panics on some malformed inputs
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem(input)
        }));

        match outcome {
            Ok(Ok(text)) => Ok(normalize_layout(&text)),
            Ok(Err(e)) => {
                warn!(error = %e, "PDF extraction failed");
                Err(ctx.malformed(e.to_string()))
            },
            Err(_) => {
                warn!("PDF extraction panicked");
                Err(ctx.malformed("unreadable content streams"))
            },
        }
    }
}

fn check_trailer(input: &[u8], ctx: &DecodeContext<'_>) -> Result<()> {
    let tail = &input[input.len().saturating_sub(TRAILER_WINDOW)..];
    if memmem::rfind(tail, b"%%EOF").is_none() {
        return Err(ctx.malformed("missing %%EOF marker"));
    }
    if memmem::rfind(tail, b"startxref").is_none() {
        return Err(ctx.malformed("missing startxref"));
    }
    Ok(())
}

/// Trim trailing spaces from every line and collapse runs of blank lines
/// into one.
fn normalize_layout(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_run = 0usize;

    for line in text.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            blank_run += 1;
            continue;
        }
        if !out.is_empty() {
            out.push_str(if blank_run > 0 { "\n\n" } else { "\n" });
        }
        out.push_str(line);
        blank_run = 0;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::FormatTag;
    use crate::extract::ExtractOptions;

    fn decode(data: &[u8]) -> Result<String> {
        let options = ExtractOptions::default();
        let ctx = DecodeContext::new(&options, FormatTag::Pdf);
        PdfDecoder.decode(data, &ctx)
    }

    #[test]
    fn test_truncated_pdf_is_malformed() {
        let err = decode(b"%PDF-1.7\n1 0 obj\n<< /Type /Catalog").unwrap_err();
        assert!(err.is_malformed());
        assert_eq!(err.format(), Some(FormatTag::Pdf));
    }

    #[test]
    fn test_garbage_body_is_malformed() {
        let err = decode(b"%PDF-1.4\ngarbage\nstartxref\n999999\n%%EOF\n").unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_normalize_layout() {
        assert_eq!(
            normalize_layout("\n\nTitle  \n\n\n\nBody line\nnext   \n\n"),
            "Title\n\nBody line\nnext"
        );
        assert_eq!(normalize_layout(""), "");
    }
}
