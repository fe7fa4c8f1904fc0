//! Word (.docx) text extraction.

use super::package::OpcPackage;
use super::rels::reltype;
use crate::common::Result;
use crate::common::text_builder::TextBuilder;
use crate::common::xml::{SubtreeFilter, XmlNode, walk_xml};
use crate::extract::{DecodeContext, Decoder};

const DEFAULT_MAIN_PART: &str = "word/document.xml";

/// Elements whose content is never part of the visible text.
fn is_hidden(name: &[u8]) -> bool {
    matches!(
        name,
        b"Fallback" | b"pPr" | b"rPr" | b"sectPr" | b"instrText" | b"delText"
    )
}

/// Decoder for WordprocessingML documents.
#[derive(Debug, Default, Clone, Copy)]
pub struct DocxDecoder;

impl Decoder for DocxDecoder {
    fn decode(&self, input: &[u8], ctx: &DecodeContext<'_>) -> Result<String> {
        let mut package = OpcPackage::open(input, ctx)?;
        let main = package.main_part(DEFAULT_MAIN_PART, ctx)?;
        let xml = package.read_part(&main, ctx)?;

        let mut out = TextBuilder::with_capacity(xml.len() / 4);
        render_story(&xml, ctx, &mut out)?;

        // Notes follow the body
        let rels = package.relationships(&main, ctx)?;
        for suffix in [reltype::FOOTNOTES, reltype::ENDNOTES] {
            if let Some(rel) = rels.first_of(suffix)
                && let Some(notes) = package.read_optional_part(&rel.target, ctx)?
            {
                out.section_break();
                render_story(&notes, ctx, &mut out)?;
            }
        }

        Ok(out.finish())
    }
}

/// Append the text of one story part (body, footnotes, endnotes).
fn render_story(xml: &[u8], ctx: &DecodeContext<'_>, out: &mut TextBuilder) -> Result<()> {
    let mut filter = SubtreeFilter::default();
    let mut in_text = false;
    let mut cell_depth = 0usize;

    walk_xml(xml, ctx, |node| {
        if filter.skips(&node, is_hidden) {
            return Ok(());
        }
        match node {
            XmlNode::Open(e) => match e.local_name().as_ref() {
                b"t" => in_text = true,
                b"tc" => cell_depth += 1,
                _ => {},
            },
            XmlNode::Empty(e) => match e.local_name().as_ref() {
                b"tab" | b"ptab" => out.push('\t'),
                b"br" | b"cr" if cell_depth > 0 => out.soft_break(),
                b"br" | b"cr" => out.end_paragraph(),
                b"noBreakHyphen" => out.push('-'),
                _ => {},
            },
            XmlNode::Close(name) => match name {
                b"t" => in_text = false,
                b"p" if cell_depth > 0 => out.soft_break(),
                b"p" => out.end_paragraph(),
                b"tc" => {
                    cell_depth = cell_depth.saturating_sub(1);
                    out.end_cell();
                },
                b"tr" => out.end_row(),
                _ => {},
            },
            XmlNode::Text(text) if in_text => out.push_str(text),
            XmlNode::Text(_) => {},
        }
        Ok(())
    })
}
