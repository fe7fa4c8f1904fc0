//! EPUB e-book text extraction.
//!
//! `META-INF/container.xml` names the package document, whose spine lists
//! the content documents in reading order. Each content document becomes
//! one section of the output.

mod package;
mod xhtml;

use crate::common::archive::{ZipPackage, part_dir};
use crate::common::text_builder::TextBuilder;
use crate::common::{Error, Result};
use crate::extract::{DecodeContext, Decoder};
use tracing::debug;

const CONTAINER_PART: &str = "META-INF/container.xml";
const ENCRYPTION_PART: &str = "META-INF/encryption.xml";

/// Decoder for EPUB 2 and EPUB 3 publications.
#[derive(Debug, Default, Clone, Copy)]
pub struct EpubDecoder;

impl Decoder for EpubDecoder {
    fn decode(&self, input: &[u8], ctx: &DecodeContext<'_>) -> Result<String> {
        let mut zip = ZipPackage::open(input, ctx)?;

        let container = zip.read_part(CONTAINER_PART, ctx)?;
        let opf_path = package::rootfile_path(&container, ctx)?
            .ok_or_else(|| ctx.malformed("container.xml names no rootfile"))?;
        let opf = zip.read_part(&opf_path, ctx)?;
        let spine = package::spine_documents(&opf, part_dir(&opf_path), ctx)?;
        debug!(package = %opf_path, documents = spine.len(), "spine");

        // Font obfuscation also uses encryption.xml; only encrypted text matters
        if let Some(encryption) = zip.read_optional_part(ENCRYPTION_PART, ctx)? {
            let encrypted = package::encrypted_parts(&encryption, ctx)?;
            if spine.iter().any(|doc| encrypted.contains(doc)) {
                return Err(Error::Encrypted(ctx.format()));
            }
        }

        let mut out = TextBuilder::default();
        for doc in &spine {
            let Some(xml) = zip.read_optional_part(doc, ctx)? else {
                debug!(part = %doc, "spine document missing");
                continue;
            };
            out.section_break();
            xhtml::render_xhtml(&xml, ctx, &mut out)?;
        }

        Ok(out.finish())
    }
}
