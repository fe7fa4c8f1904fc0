//! Excel (.xlsx) text extraction.
//!
//! Sheets are emitted in workbook order. Each non-empty row becomes one line
//! of tab-separated cell values; columns skipped in a sparse row keep their
//! position as empty cells. Formulas are not emitted, only their cached
//! values.

use super::package::OpcPackage;
use super::rels::{relationship_id, reltype};
use crate::common::Result;
use crate::common::text_builder::TextBuilder;
use crate::common::xml::{SubtreeFilter, XmlNode, attribute, walk_xml};
use crate::extract::{DecodeContext, Decoder};
use tracing::debug;

const DEFAULT_WORKBOOK: &str = "xl/workbook.xml";
const DEFAULT_SHARED_STRINGS: &str = "xl/sharedStrings.xml";

/// Column count of the widest sheet Excel can produce.
const MAX_COLUMNS: usize = 16_384;

/// Decoder for SpreadsheetML workbooks.
#[derive(Debug, Default, Clone, Copy)]
pub struct XlsxDecoder;

impl Decoder for XlsxDecoder {
    fn decode(&self, input: &[u8], ctx: &DecodeContext<'_>) -> Result<String> {
        let mut package = OpcPackage::open(input, ctx)?;
        let workbook = package.main_part(DEFAULT_WORKBOOK, ctx)?;
        let rels = package.relationships(&workbook, ctx)?;
        let workbook_xml = package.read_part(&workbook, ctx)?;

        let shared_strings_part = rels
            .first_of(reltype::SHARED_STRINGS)
            .map_or(DEFAULT_SHARED_STRINGS, |rel| rel.target.as_str());
        let shared = match package.read_optional_part(shared_strings_part, ctx)? {
            Some(xml) => parse_shared_strings(&xml, ctx)?,
            None => Vec::new(),
        };

        let mut sheets: Vec<String> = parse_sheet_ids(&workbook_xml, ctx)?
            .iter()
            .filter_map(|r_id| match rels.get(r_id) {
                Some(rel) => Some(rel.target.clone()),
                None => {
                    debug!(%r_id, "sheet without relationship");
                    None
                },
            })
            .collect();
        if sheets.is_empty() {
            sheets = rels
                .all_of(reltype::WORKSHEET)
                .map(|rel| rel.target.clone())
                .collect();
        }

        let mut out = TextBuilder::default();
        for sheet in &sheets {
            let Some(xml) = package.read_optional_part(sheet, ctx)? else {
                debug!(part = %sheet, "sheet part missing");
                continue;
            };
            out.section_break();
            render_sheet(&xml, &shared, ctx, &mut out)?;
        }

        Ok(out.finish())
    }
}

/// Relationship IDs of the sheets listed in the workbook, in tab order.
fn parse_sheet_ids(xml: &[u8], ctx: &DecodeContext<'_>) -> Result<Vec<String>> {
    let mut ids = Vec::new();
    walk_xml(xml, ctx, |node| {
        if let XmlNode::Open(e) | XmlNode::Empty(e) = node
            && e.local_name().as_ref() == b"sheet"
            && let Some(id) = relationship_id(e)
        {
            ids.push(id);
        }
        Ok(())
    })?;
    Ok(ids)
}

/// Parse the shared strings table. Phonetic runs are not part of the text.
fn parse_shared_strings(xml: &[u8], ctx: &DecodeContext<'_>) -> Result<Vec<String>> {
    let mut strings = Vec::new();
    let mut current = String::new();
    let mut in_text = false;
    let mut filter = SubtreeFilter::default();

    walk_xml(xml, ctx, |node| {
        if filter.skips(&node, |name| name == b"rPh") {
            return Ok(());
        }
        match node {
            XmlNode::Open(e) => match e.local_name().as_ref() {
                b"si" => current.clear(),
                b"t" => in_text = true,
                _ => {},
            },
            XmlNode::Empty(e) if e.local_name().as_ref() == b"si" => strings.push(String::new()),
            XmlNode::Close(b"t") => in_text = false,
            XmlNode::Close(b"si") => strings.push(std::mem::take(&mut current)),
            XmlNode::Text(text) if in_text => current.push_str(text),
            _ => {},
        }
        Ok(())
    })?;

    Ok(strings)
}

/// Zero-based column of a cell reference such as `AB12`.
fn column_index(reference: &str) -> Option<usize> {
    let letters = reference
        .bytes()
        .take_while(|b| b.is_ascii_alphabetic())
        .try_fold(0usize, |acc, b| {
            let digit = (b.to_ascii_uppercase() - b'A') as usize + 1;
            acc.checked_mul(26)?.checked_add(digit)
        })?;
    letters.checked_sub(1).filter(|&col| col < MAX_COLUMNS)
}

/// Where the cell currently being read stands.
#[derive(Debug, Default)]
struct CellState {
    kind: Option<String>,
    column: Option<usize>,
    value: String,
    in_value: bool,
}

fn render_sheet(
    xml: &[u8],
    shared: &[String],
    ctx: &DecodeContext<'_>,
    out: &mut TextBuilder,
) -> Result<()> {
    let mut filter = SubtreeFilter::default();
    let mut cell = CellState::default();
    let mut next_column = 0usize;
    let mut row_has_content = false;

    walk_xml(xml, ctx, |node| {
        if filter.skips(&node, |name| matches!(name, b"f" | b"rPh" | b"extLst")) {
            return Ok(());
        }
        match node {
            XmlNode::Open(e) => match e.local_name().as_ref() {
                b"row" => {
                    next_column = 0;
                    row_has_content = false;
                },
                b"c" => {
                    cell = CellState {
                        kind: attribute(e, b"t"),
                        column: attribute(e, b"r").as_deref().and_then(column_index),
                        ..CellState::default()
                    };
                },
                // Cached values and inline string runs
                b"v" | b"t" => cell.in_value = true,
                _ => {},
            },
            XmlNode::Text(text) if cell.in_value => cell.value.push_str(text),
            XmlNode::Close(b"v" | b"t") => cell.in_value = false,
            XmlNode::Close(b"c") => {
                let text = cell_text(&cell, shared);
                if !text.is_empty() {
                    let column = cell.column.unwrap_or(next_column).max(next_column);
                    for _ in next_column..column {
                        out.end_cell();
                    }
                    out.push_str(&text);
                    out.end_cell();
                    next_column = column + 1;
                    row_has_content = true;
                }
            },
            XmlNode::Close(b"row") if row_has_content => out.end_row(),
            _ => {},
        }
        Ok(())
    })
}

/// Display text of a finished cell, on a single line.
///
/// String cells keep their spacing; numbers and other cached values are
/// trimmed.
fn cell_text(cell: &CellState, shared: &[String]) -> String {
    let raw = match cell.kind.as_deref() {
        Some("s") => cell
            .value
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|index| shared.get(index))
            .map_or("", String::as_str),
        Some("inlineStr" | "str") => cell.value.as_str(),
        Some("b") => match cell.value.trim() {
            "1" => "TRUE",
            _ => "FALSE",
        },
        _ => cell.value.trim(),
    };
    raw.replace(['\r', '\n', '\t'], " ")
}
