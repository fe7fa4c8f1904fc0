//! Relationship parts of an OPC package.
//!
//! Every part may have a companion `_rels/<name>.rels` part listing its
//! relationships. Only internal relationships are kept, with their targets
//! already resolved to absolute part names.

use crate::common::Result;
use crate::common::archive::{part_dir, resolve_part_path};
use crate::common::xml::{XmlNode, attribute, unescape, walk_xml};
use crate::extract::DecodeContext;
use quick_xml::events::BytesStart;

/// Relationship type suffixes. Transitional and strict documents use
/// different namespace prefixes for the same types.
pub mod reltype {
    pub const OFFICE_DOCUMENT: &str = "/officeDocument";
    pub const WORKSHEET: &str = "/worksheet";
    pub const SHARED_STRINGS: &str = "/sharedStrings";
    pub const SLIDE: &str = "/slide";
    pub const FOOTNOTES: &str = "/footnotes";
    pub const ENDNOTES: &str = "/endnotes";
}

/// A single internal relationship.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Relationship ID (e.g., "rId1")
    pub r_id: String,
    /// Relationship type URI
    pub reltype: String,
    /// Absolute part name of the target, without leading `/`
    pub target: String,
}

impl Relationship {
    /// Whether the type URI ends with `suffix` (one of [`reltype`]).
    #[inline]
    pub fn is(&self, suffix: &str) -> bool {
        self.reltype.ends_with(suffix)
    }
}

/// Relationships of one source part, in document order.
#[derive(Debug, Default)]
pub struct Relationships {
    rels: Vec<Relationship>,
}

impl Relationships {
    /// Parse the `.rels` XML of `source` (empty for the package itself).
    pub fn parse(xml: &[u8], source: &str, ctx: &DecodeContext<'_>) -> Result<Self> {
        let base_dir = part_dir(source);
        let mut rels = Vec::new();

        walk_xml(xml, ctx, |node| {
            let (XmlNode::Open(e) | XmlNode::Empty(e)) = node else {
                return Ok(());
            };
            if e.local_name().as_ref() != b"Relationship" {
                return Ok(());
            }
            if attribute(e, b"TargetMode").is_some_and(|mode| mode == "External") {
                return Ok(());
            }
            if let (Some(r_id), Some(reltype), Some(target)) = (
                attribute(e, b"Id"),
                attribute(e, b"Type"),
                attribute(e, b"Target"),
            ) {
                rels.push(Relationship {
                    r_id,
                    reltype,
                    target: resolve_part_path(base_dir, &target),
                });
            }
            Ok(())
        })?;

        Ok(Self { rels })
    }

    /// Get a relationship by its ID.
    pub fn get(&self, r_id: &str) -> Option<&Relationship> {
        self.rels.iter().find(|rel| rel.r_id == r_id)
    }

    /// First relationship of the given type.
    pub fn first_of(&self, suffix: &str) -> Option<&Relationship> {
        self.rels.iter().find(|rel| rel.is(suffix))
    }

    /// All relationships of the given type, in document order.
    pub fn all_of<'s>(&'s self, suffix: &'s str) -> impl Iterator<Item = &'s Relationship> {
        self.rels.iter().filter(move |rel| rel.is(suffix))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rels.is_empty()
    }
}

/// The namespaced `id` attribute (`r:id`) referencing a relationship.
///
/// Elements such as `p:sldId` carry an unprefixed `id` as well, which is
/// not a relationship ID.
pub fn relationship_id(element: &BytesStart<'_>) -> Option<String> {
    element
        .attributes()
        .flatten()
        .find(|attr| attr.key.local_name().as_ref() == b"id" && attr.key.prefix().is_some())
        .map(|attr| unescape(&attr.value))
}

/// Name of the relationship part belonging to `source`.
///
/// # Examples
///
/// ```
/// use textractor::ooxml::rels::rels_part_name;
///
/// assert_eq!(rels_part_name(""), "_rels/.rels");
/// assert_eq!(rels_part_name("word/document.xml"), "word/_rels/document.xml.rels");
/// ```
pub fn rels_part_name(source: &str) -> String {
    let dir = part_dir(source);
    let file = &source[dir.len()..];
    format!("{}_rels/{}.rels", dir, file)
}
