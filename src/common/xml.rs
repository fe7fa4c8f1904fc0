//! Streaming XML traversal for the package-based decoders.
//!
//! OOXML, OpenDocument and EPUB parts are walked with quick-xml. [`walk_xml`]
//! wraps the event loop so that every decoder gets the same treatment of
//! entity references, nesting limits and truncated documents, and only has
//! to react to element boundaries and text.

use crate::common::Result;
use crate::extract::DecodeContext;
use quick_xml::Reader;
use quick_xml::escape::resolve_html5_entity;
use quick_xml::events::{BytesStart, Event};

/// One step of an XML walk.
#[derive(Debug)]
pub enum XmlNode<'e> {
    /// Start tag of an element with content
    Open(&'e BytesStart<'e>),
    /// Self-closing element
    Empty(&'e BytesStart<'e>),
    /// End tag, given by local name
    Close(&'e [u8]),
    /// Character data with references resolved
    Text(&'e str),
}

/// Resolve the name of a character or entity reference (without `&` and
/// `;`). Besides the five XML entities, every HTML5 named reference is
/// accepted, since XHTML content documents routinely use them. Unknown names
/// resolve to `None`.
///
/// # Examples
///
/// ```
/// use textractor::common::xml::resolve_reference;
///
/// assert_eq!(resolve_reference("amp").as_deref(), Some("&"));
/// assert_eq!(resolve_reference("#x41").as_deref(), Some("A"));
/// assert_eq!(resolve_reference("#233").as_deref(), Some("é"));
/// assert_eq!(resolve_reference("mdash").as_deref(), Some("\u{2014}"));
/// assert_eq!(resolve_reference("iuml").as_deref(), Some("ï"));
/// assert_eq!(resolve_reference("bogus"), None);
/// ```
pub fn resolve_reference(name: &str) -> Option<String> {
    if let Some(number) = name.strip_prefix('#') {
        let code = match number.strip_prefix(|c: char| c == 'x' || c == 'X') {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => number.parse::<u32>().ok()?,
        };
        return char::from_u32(code).map(String::from);
    }

    resolve_html5_entity(name).map(str::to_string)
}

/// Replace references in raw attribute or text bytes.
///
/// Unknown or unterminated references are kept literally.
pub fn unescape(raw: &[u8]) -> String {
    let text = String::from_utf8_lossy(raw);
    if !text.contains('&') {
        return text.into_owned();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text.as_ref();
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let candidate = &rest[start + 1..];
        match candidate.find(';') {
            Some(end) if end > 0 && end <= 32 => {
                match resolve_reference(&candidate[..end]) {
                    Some(resolved) => out.push_str(&resolved),
                    None => out.push_str(&rest[start..start + end + 2]),
                }
                rest = &candidate[end + 1..];
            },
            _ => {
                out.push('&');
                rest = candidate;
            },
        }
    }
    out.push_str(rest);
    out
}

/// Value of the attribute whose qualified name is `key` (e.g. `r:id`).
pub fn attribute(element: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    element
        .attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .map(|attr| unescape(&attr.value))
}

/// Value of the first attribute whose local name is `local`, whatever its
/// namespace prefix.
pub fn local_attribute(element: &BytesStart<'_>, local: &[u8]) -> Option<String> {
    element
        .attributes()
        .flatten()
        .find(|attr| attr.key.local_name().as_ref() == local)
        .map(|attr| unescape(&attr.value))
}

/// Hides the subtrees rooted at selected elements from a walk.
///
/// Feed every node to [`skips`](Self::skips) and ignore the node when it
/// returns `true`.
#[derive(Debug, Default)]
pub struct SubtreeFilter {
    depth: usize,
}

impl SubtreeFilter {
    /// Whether `node` belongs to a hidden subtree. `hidden` receives the local
    /// name of each element outside hidden subtrees.
    pub fn skips(&mut self, node: &XmlNode<'_>, hidden: impl Fn(&[u8]) -> bool) -> bool {
        match node {
            XmlNode::Open(e) => {
                if self.depth > 0 || hidden(e.local_name().as_ref()) {
                    self.depth += 1;
                    return true;
                }
                false
            },
            XmlNode::Empty(e) => self.depth > 0 || hidden(e.local_name().as_ref()),
            XmlNode::Close(_) => {
                if self.depth > 0 {
                    self.depth -= 1;
                    return true;
                }
                false
            },
            XmlNode::Text(_) => self.depth > 0,
        }
    }
}

/// Walk `xml`, calling `visit` for each element boundary and text run.
///
/// Fails with `MalformedDocument` on syntax errors, mismatched end tags and
/// elements left open at the end of the input, and with `LimitExceeded` when
/// nesting goes deeper than the configured limit.
pub fn walk_xml<F>(xml: &[u8], ctx: &DecodeContext<'_>, mut visit: F) -> Result<()>
where
    F: FnMut(XmlNode<'_>) -> Result<()>,
{
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);

    let mut buf = Vec::with_capacity(1024); // Reusable buffer
    let mut depth = 0usize;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                depth += 1;
                ctx.check_depth(depth)?;
                visit(XmlNode::Open(&e))?;
            },
            Ok(Event::Empty(e)) => visit(XmlNode::Empty(&e))?,
            Ok(Event::End(e)) => {
                depth = depth.saturating_sub(1);
                visit(XmlNode::Close(e.local_name().as_ref()))?;
            },
            Ok(Event::Text(e)) => {
                let text = String::from_utf8_lossy(e.as_ref());
                visit(XmlNode::Text(&text))?;
            },
            Ok(Event::CData(e)) => {
                let text = String::from_utf8_lossy(e.as_ref());
                visit(XmlNode::Text(&text))?;
            },
            Ok(Event::GeneralRef(e)) => {
                let name = String::from_utf8_lossy(e.as_ref());
                match resolve_reference(&name) {
                    Some(resolved) => visit(XmlNode::Text(&resolved))?,
                    // Entities declared in a DTD are not expanded
                    None => visit(XmlNode::Text(&format!("&{};", name)))?,
                }
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ctx.malformed(format!(
                    "XML error at byte {}: {}",
                    reader.error_position(),
                    e
                )));
            },
            _ => {},
        }
        buf.clear();
    }

    if depth != 0 {
        return Err(ctx.malformed("XML ends inside an open element"));
    }

    Ok(())
}
