//! PowerPoint (.pptx) text extraction.

use super::package::OpcPackage;
use super::rels::{relationship_id, reltype};
use crate::common::Result;
use crate::common::text_builder::TextBuilder;
use crate::common::xml::{SubtreeFilter, XmlNode, walk_xml};
use crate::extract::{DecodeContext, Decoder};
use tracing::debug;

const DEFAULT_PRESENTATION: &str = "ppt/presentation.xml";

/// Decoder for PresentationML decks.
#[derive(Debug, Default, Clone, Copy)]
pub struct PptxDecoder;

impl Decoder for PptxDecoder {
    fn decode(&self, input: &[u8], ctx: &DecodeContext<'_>) -> Result<String> {
        let mut package = OpcPackage::open(input, ctx)?;
        let presentation = package.main_part(DEFAULT_PRESENTATION, ctx)?;
        let slides = slide_parts(&mut package, &presentation, ctx)?;
        debug!(count = slides.len(), "slides");

        let mut out = TextBuilder::default();
        for slide in &slides {
            let Some(xml) = package.read_optional_part(slide, ctx)? else {
                debug!(part = %slide, "slide part missing");
                continue;
            };
            out.section_break();
            render_slide(&xml, ctx, &mut out)?;
        }

        Ok(out.finish())
    }
}

/// Slide part names in presentation order.
///
/// The order comes from `p:sldIdLst`. Packages without a usable list fall
/// back to the numeric order of the slide part names.
fn slide_parts(
    package: &mut OpcPackage<'_>,
    presentation: &str,
    ctx: &DecodeContext<'_>,
) -> Result<Vec<String>> {
    let rels = package.relationships(presentation, ctx)?;

    if let Some(xml) = package.read_optional_part(presentation, ctx)? {
        let mut ids = Vec::new();
        walk_xml(&xml, ctx, |node| {
            if let XmlNode::Open(e) | XmlNode::Empty(e) = node
                && e.local_name().as_ref() == b"sldId"
                && let Some(id) = relationship_id(e)
            {
                ids.push(id);
            }
            Ok(())
        })?;

        let ordered: Vec<String> = ids
            .iter()
            .filter_map(|id| rels.get(id))
            .map(|rel| rel.target.clone())
            .collect();
        if !ordered.is_empty() {
            return Ok(ordered);
        }
    }

    let mut numbered: Vec<(u32, String)> = rels
        .all_of(reltype::SLIDE)
        .map(|rel| rel.target.clone())
        .chain(package.part_names().map(str::to_string))
        .filter_map(|name| slide_number(&name).map(|n| (n, name)))
        .collect();
    numbered.sort_unstable();
    numbered.dedup();
    Ok(numbered.into_iter().map(|(_, name)| name).collect())
}

/// Number of a part named `ppt/slides/slideN.xml`.
fn slide_number(name: &str) -> Option<u32> {
    name.strip_prefix("ppt/slides/slide")?
        .strip_suffix(".xml")?
        .parse()
        .ok()
}

fn render_slide(xml: &[u8], ctx: &DecodeContext<'_>, out: &mut TextBuilder) -> Result<()> {
    let mut filter = SubtreeFilter::default();
    let mut in_text = false;
    let mut cell_depth = 0usize;

    walk_xml(xml, ctx, |node| {
        if filter.skips(&node, |name| matches!(name, b"Fallback" | b"extLst")) {
            return Ok(());
        }
        match node {
            XmlNode::Open(e) => match e.local_name().as_ref() {
                b"t" => in_text = true,
                b"tc" => cell_depth += 1,
                _ => {},
            },
            XmlNode::Empty(e) if e.local_name().as_ref() == b"br" => {
                if cell_depth > 0 {
                    out.soft_break();
                } else {
                    out.end_paragraph();
                }
            },
            XmlNode::Close(b"t") => in_text = false,
            XmlNode::Close(b"p") if cell_depth > 0 => out.soft_break(),
            XmlNode::Close(b"p") => out.end_block(),
            XmlNode::Close(b"tc") => {
                cell_depth = cell_depth.saturating_sub(1);
                out.end_cell();
            },
            XmlNode::Close(b"tr") => out.end_row(),
            XmlNode::Text(text) if in_text => out.push_str(text),
            _ => {},
        }
        Ok(())
    })
}
