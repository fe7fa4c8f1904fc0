//! EPUB container and package document parsing.

use crate::common::Result;
use crate::common::archive::resolve_part_path;
use crate::common::xml::{XmlNode, local_attribute, walk_xml};
use crate::extract::DecodeContext;
use std::collections::HashMap;

/// Media types of spine items that carry readable text.
const CONTENT_MEDIA_TYPES: &[&str] = &["application/xhtml+xml", "text/html", "application/xml"];

/// Path of the first rootfile (the OPF package document) named in
/// `META-INF/container.xml`.
pub fn rootfile_path(container: &[u8], ctx: &DecodeContext<'_>) -> Result<Option<String>> {
    let mut path = None;
    walk_xml(container, ctx, |node| {
        if path.is_none()
            && let XmlNode::Open(e) | XmlNode::Empty(e) = node
            && e.local_name().as_ref() == b"rootfile"
        {
            path = local_attribute(e, b"full-path").map(|p| resolve_part_path("", &percent_decode(&p)));
        }
        Ok(())
    })?;
    Ok(path)
}

/// Manifest entry of a package document.
#[derive(Debug)]
struct ManifestItem {
    href: String,
    media_type: String,
}

/// Part names of the spine documents in reading order.
///
/// `base_dir` is the directory of the package document; manifest hrefs are
/// relative to it. Spine entries that reference unknown manifest items or
/// non-document media are left out.
pub fn spine_documents(opf: &[u8], base_dir: &str, ctx: &DecodeContext<'_>) -> Result<Vec<String>> {
    let mut manifest: HashMap<String, ManifestItem> = HashMap::new();
    let mut spine: Vec<String> = Vec::new();

    walk_xml(opf, ctx, |node| {
        let (XmlNode::Open(e) | XmlNode::Empty(e)) = node else {
            return Ok(());
        };
        match e.local_name().as_ref() {
            b"item" => {
                if let (Some(id), Some(href)) =
                    (local_attribute(e, b"id"), local_attribute(e, b"href"))
                {
                    let media_type = local_attribute(e, b"media-type").unwrap_or_default();
                    manifest.insert(id, ManifestItem { href, media_type });
                }
            },
            b"itemref" => {
                if let Some(idref) = local_attribute(e, b"idref") {
                    spine.push(idref);
                }
            },
            _ => {},
        }
        Ok(())
    })?;

    Ok(spine
        .iter()
        .filter_map(|idref| manifest.get(idref))
        .filter(|item| CONTENT_MEDIA_TYPES.contains(&item.media_type.as_str()))
        .map(|item| resolve_part_path(base_dir, &percent_decode(&item.href)))
        .collect())
}

/// Part names listed as encrypted in `META-INF/encryption.xml`.
pub fn encrypted_parts(encryption: &[u8], ctx: &DecodeContext<'_>) -> Result<Vec<String>> {
    let mut parts = Vec::new();
    walk_xml(encryption, ctx, |node| {
        if let XmlNode::Open(e) | XmlNode::Empty(e) = node
            && e.local_name().as_ref() == b"CipherReference"
            && let Some(uri) = local_attribute(e, b"URI")
        {
            parts.push(resolve_part_path("", &percent_decode(&uri)));
        }
        Ok(())
    })?;
    Ok(parts)
}

/// Decode `%XX` escapes in an IRI reference. Malformed escapes are kept.
fn percent_decode(href: &str) -> String {
    if !href.contains('%') {
        return href.to_string();
    }

    let bytes = href.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%'
            && let Some(hex) = href.get(i + 1..i + 3)
            && let Ok(byte) = u8::from_str_radix(hex, 16)
        {
            decoded.push(byte);
            i += 3;
            continue;
        }
        decoded.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&decoded).into_owned()
}
