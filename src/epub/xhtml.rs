//! XHTML content documents to text.

use crate::common::Result;
use crate::common::text_builder::TextBuilder;
use crate::common::xml::{SubtreeFilter, XmlNode, walk_xml};
use crate::extract::DecodeContext;
use phf::phf_set;

/// Elements that start and end a line of their own.
static BLOCK_ELEMENTS: phf::Set<&'static [u8]> = phf_set! {
    b"address", b"article", b"aside", b"blockquote", b"body", b"caption",
    b"dd", b"div", b"dl", b"dt", b"figcaption", b"figure", b"footer",
    b"h1", b"h2", b"h3", b"h4", b"h5", b"h6", b"header", b"hr", b"li",
    b"main", b"nav", b"ol", b"p", b"pre", b"section", b"table", b"ul",
};

/// Elements whose content is not rendered.
fn is_hidden(name: &[u8]) -> bool {
    matches!(
        name,
        b"head" | b"script" | b"style" | b"template" | b"rt" | b"rp"
    )
}

/// Append the text of one content document.
pub fn render_xhtml(xml: &[u8], ctx: &DecodeContext<'_>, out: &mut TextBuilder) -> Result<()> {
    let mut filter = SubtreeFilter::default();
    let mut cell_depth = 0usize;
    let mut pre_depth = 0usize;

    walk_xml(xml, ctx, |node| {
        if filter.skips(&node, is_hidden) {
            return Ok(());
        }
        match node {
            XmlNode::Open(e) => {
                let name = e.local_name();
                let name = name.as_ref();
                match name {
                    b"td" | b"th" => cell_depth += 1,
                    b"pre" => pre_depth += 1,
                    _ => {},
                }
                if BLOCK_ELEMENTS.contains(name) {
                    block_boundary(out, cell_depth);
                }
            },
            XmlNode::Empty(e) => match e.local_name().as_ref() {
                b"br" if cell_depth > 0 => out.soft_break(),
                b"br" => out.end_paragraph(),
                b"hr" => block_boundary(out, cell_depth),
                _ => {},
            },
            XmlNode::Close(name) => {
                match name {
                    b"td" | b"th" => {
                        cell_depth = cell_depth.saturating_sub(1);
                        out.end_cell();
                    },
                    b"tr" => out.end_row(),
                    b"pre" => pre_depth = pre_depth.saturating_sub(1),
                    _ => {},
                }
                if BLOCK_ELEMENTS.contains(name) {
                    block_boundary(out, cell_depth);
                }
            },
            XmlNode::Text(text) if pre_depth > 0 && cell_depth == 0 => out.push_str(text),
            XmlNode::Text(text) => out.push_collapsed(text),
        }
        Ok(())
    })
}

fn block_boundary(out: &mut TextBuilder, cell_depth: usize) {
    if cell_depth > 0 {
        out.soft_break();
    } else {
        out.end_block();
    }
}
