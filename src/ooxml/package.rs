//! OPC package access shared by the OOXML decoders.

use super::rels::{Relationships, rels_part_name, reltype};
use crate::common::Result;
use crate::common::archive::ZipPackage;
use crate::extract::DecodeContext;
use tracing::trace;

/// An Open Packaging Conventions package over a ZIP archive.
pub struct OpcPackage<'a> {
    zip: ZipPackage<'a>,
}

impl<'a> OpcPackage<'a> {
    /// Open the package in `data`.
    pub fn open(data: &'a [u8], ctx: &DecodeContext<'_>) -> Result<Self> {
        Ok(Self {
            zip: ZipPackage::open(data, ctx)?,
        })
    }

    /// Name of the main document part.
    ///
    /// Follows the `officeDocument` relationship of the package and falls
    /// back to `default` when the package has no usable relationships.
    pub fn main_part(&mut self, default: &str, ctx: &DecodeContext<'_>) -> Result<String> {
        let rels = self.relationships("", ctx)?;
        let main = rels
            .first_of(reltype::OFFICE_DOCUMENT)
            .map(|rel| rel.target.clone())
            .filter(|name| self.zip.has_part(name))
            .unwrap_or_else(|| default.to_string());
        trace!(part = %main, "main document part");
        Ok(main)
    }

    /// Relationships of `source`; empty if it has no relationship part.
    pub fn relationships(&mut self, source: &str, ctx: &DecodeContext<'_>) -> Result<Relationships> {
        match self.zip.read_optional_part(&rels_part_name(source), ctx)? {
            Some(xml) => Relationships::parse(&xml, source, ctx),
            None => Ok(Relationships::default()),
        }
    }

    /// Names of all parts.
    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.zip.part_names()
    }

    #[inline]
    pub fn read_part(&mut self, name: &str, ctx: &DecodeContext<'_>) -> Result<Vec<u8>> {
        self.zip.read_part(name, ctx)
    }

    #[inline]
    pub fn read_optional_part(
        &mut self,
        name: &str,
        ctx: &DecodeContext<'_>,
    ) -> Result<Option<Vec<u8>>> {
        self.zip.read_optional_part(name, ctx)
    }
}
