//! Bounded access to ZIP containers.
//!
//! OOXML, OpenDocument and EPUB are all ZIP packages. Every part read through
//! [`ZipPackage`] is checked against the per-part and per-call limits of the
//! [`DecodeContext`], so a decompression bomb fails early instead of
//! inflating into memory.

use crate::common::{Error, Result};
use crate::extract::DecodeContext;
use std::io::{Cursor, Read};
use zip::ZipArchive;
use zip::result::ZipError;

/// A ZIP archive opened over a borrowed input buffer.
pub struct ZipPackage<'a> {
    archive: ZipArchive<Cursor<&'a [u8]>>,
}

impl<'a> ZipPackage<'a> {
    /// Open the central directory of `data`.
    ///
    /// Fails with `MalformedDocument` if the archive cannot be read and with
    /// `LimitExceeded` if it holds more entries than allowed.
    pub fn open(data: &'a [u8], ctx: &DecodeContext<'_>) -> Result<Self> {
        let archive = ZipArchive::new(Cursor::new(data))
            .map_err(|e| ctx.malformed(format!("invalid ZIP archive: {}", e)))?;

        let max_entries = ctx.options().max_entries;
        if archive.len() > max_entries {
            return Err(Error::limit("ZIP entry count", max_entries));
        }

        Ok(Self { archive })
    }

    /// Number of entries in the archive.
    #[inline]
    pub fn len(&self) -> usize {
        self.archive.len()
    }

    /// Whether the archive has no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.archive.len() == 0
    }

    /// Check if a part exists in the package.
    #[inline]
    pub fn has_part(&self, name: &str) -> bool {
        self.archive.index_for_name(name).is_some()
    }

    /// Names of all entries, in central directory order.
    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.archive.file_names()
    }

    /// Read a part that must exist.
    pub fn read_part(&mut self, name: &str, ctx: &DecodeContext<'_>) -> Result<Vec<u8>> {
        self.read_optional_part(name, ctx)?
            .ok_or_else(|| ctx.malformed(format!("missing part {}", name)))
    }

    /// Read a part, returning `None` if the package has no such entry.
    pub fn read_optional_part(
        &mut self,
        name: &str,
        ctx: &DecodeContext<'_>,
    ) -> Result<Option<Vec<u8>>> {
        let limit = ctx.options().max_part_size;
        let mut file = match self.archive.by_name(name) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(ctx.malformed(format!("cannot open part {}: {}", name, e))),
        };

        // The declared size can lie, so the read itself is bounded as well.
        if file.size() > limit as u64 {
            return Err(Error::limit("ZIP part size", limit));
        }

        let mut content = Vec::with_capacity(file.size() as usize);
        (&mut file)
            .take(limit as u64 + 1)
            .read_to_end(&mut content)
            .map_err(|e| ctx.malformed(format!("cannot inflate part {}: {}", name, e)))?;

        if content.len() > limit {
            return Err(Error::limit("ZIP part size", limit));
        }
        ctx.charge(content.len())?;

        Ok(Some(content))
    }
}

/// Resolve a relationship or manifest target against the directory of the
/// part that references it.
///
/// Absolute targets (leading `/`) are taken from the package root. `.` and
/// `..` segments are folded; `..` never climbs above the root.
///
/// # Examples
///
/// ```
/// use textractor::common::archive::resolve_part_path;
///
/// assert_eq!(resolve_part_path("ppt/", "slides/slide1.xml"), "ppt/slides/slide1.xml");
/// assert_eq!(resolve_part_path("OEBPS/text/", "../images/a.png"), "OEBPS/images/a.png");
/// assert_eq!(resolve_part_path("word/", "/customXml/item1.xml"), "customXml/item1.xml");
/// ```
pub fn resolve_part_path(base_dir: &str, target: &str) -> String {
    let (base, target) = match target.strip_prefix('/') {
        Some(absolute) => ("", absolute),
        None => (base_dir, target),
    };
    // Fragment identifiers never name a part
    let target = target.split('#').next().unwrap_or_default();

    let mut segments: Vec<&str> = Vec::new();
    for segment in base.split('/').chain(target.split('/')) {
        match segment {
            "" | "." => {},
            ".." => {
                segments.pop();
            },
            other => segments.push(other),
        }
    }

    segments.join("/")
}

/// The directory part of a part name, including the trailing `/`.
#[inline]
pub fn part_dir(name: &str) -> &str {
    match name.rfind('/') {
        Some(pos) => &name[..=pos],
        None => "",
    }
}
