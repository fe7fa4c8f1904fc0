//! OpenDocument (ODT, ODS, ODP) text extraction.
//!
//! All three flavours keep their body in `content.xml` inside the ZIP
//! package. Password-protected packages declare `manifest:encryption-data`
//! for their encrypted entries and are reported as [`Error::Encrypted`].

mod content;

use crate::common::archive::ZipPackage;
use crate::common::text_builder::TextBuilder;
use crate::common::{Error, FormatTag, Result};
use crate::extract::{DecodeContext, Decoder};
use memchr::memmem;
use tracing::debug;

const CONTENT_PART: &str = "content.xml";
const MANIFEST_PART: &str = "META-INF/manifest.xml";

/// Decoder for OpenDocument text, spreadsheet and presentation packages.
#[derive(Debug, Default, Clone, Copy)]
pub struct OdfDecoder;

impl Decoder for OdfDecoder {
    fn decode(&self, input: &[u8], ctx: &DecodeContext<'_>) -> Result<String> {
        let mut package = ZipPackage::open(input, ctx)?;

        if let Some(manifest) = package.read_optional_part(MANIFEST_PART, ctx)?
            && memmem::find(&manifest, b"encryption-data").is_some()
        {
            debug!("package declares encrypted entries");
            return Err(Error::Encrypted(ctx.format()));
        }

        let xml = package.read_part(CONTENT_PART, ctx)?;
        let mut out = TextBuilder::with_capacity(xml.len() / 4);
        content::render_content(&xml, ctx, ctx.format() == FormatTag::Ods, &mut out)?;
        Ok(out.finish())
    }
}
