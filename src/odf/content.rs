//! Rendering of `content.xml` into text.
//!
//! One walker serves text documents, spreadsheets and presentations: the
//! element vocabulary is shared, only the top-level structure differs.
//! Spreadsheet tables become sections, presentation `draw:page`s become
//! sections, and tables inside text documents are laid out in place.

use crate::common::Result;
use crate::common::text_builder::TextBuilder;
use crate::common::xml::{SubtreeFilter, XmlNode, local_attribute, walk_xml};
use crate::extract::DecodeContext;
use quick_xml::events::BytesStart;

/// Upper bound for `text:s` runs.
const MAX_SPACES: usize = 1024;
/// Upper bound for emitted repetitions of a non-empty cell.
const MAX_REPEATED_CELLS: usize = 1024;
/// Upper bound for empty cells padded in front of a non-empty one.
const MAX_COLUMNS: usize = 16_384;

/// Elements whose content is never part of the visible text.
fn is_hidden(name: &[u8]) -> bool {
    matches!(
        name,
        b"annotation"
            | b"annotation-end"
            | b"tracked-changes"
            | b"note-citation"
            | b"notes"
            | b"forms"
            | b"scripts"
            | b"font-face-decls"
            | b"automatic-styles"
    )
}

/// Render `xml`. Each top-level table starts a new section when
/// `tables_are_sections` is set.
pub(super) fn render_content(
    xml: &[u8],
    ctx: &DecodeContext<'_>,
    tables_are_sections: bool,
    out: &mut TextBuilder,
) -> Result<()> {
    let mut renderer = ContentRenderer::new(out, tables_are_sections);
    walk_xml(xml, ctx, |node| {
        renderer.visit(node);
        Ok(())
    })
}

/// A cell of the outermost table being collected.
#[derive(Debug)]
struct Cell {
    text: TextBuilder,
    repeat: usize,
}

struct ContentRenderer<'o> {
    out: &'o mut TextBuilder,
    filter: SubtreeFilter,
    tables_are_sections: bool,
    paragraph_depth: usize,
    table_depth: usize,
    cell: Option<Cell>,
    /// Empty cells seen since the last non-empty one in the current row
    pending_empty: usize,
    row_has_content: bool,
}

impl<'o> ContentRenderer<'o> {
    fn new(out: &'o mut TextBuilder, tables_are_sections: bool) -> Self {
        Self {
            out,
            filter: SubtreeFilter::default(),
            tables_are_sections,
            paragraph_depth: 0,
            table_depth: 0,
            cell: None,
            pending_empty: 0,
            row_has_content: false,
        }
    }

    fn visit(&mut self, node: XmlNode<'_>) {
        if self.filter.skips(&node, is_hidden) {
            return;
        }
        match node {
            XmlNode::Open(e) => self.open(e),
            XmlNode::Empty(e) => self.empty(e),
            XmlNode::Close(name) => self.close(name),
            XmlNode::Text(text) if self.paragraph_depth > 0 => self.sink().push_collapsed(text),
            XmlNode::Text(_) => {},
        }
    }

    /// Where inline text goes: the open cell, or the document.
    fn sink(&mut self) -> &mut TextBuilder {
        match &mut self.cell {
            Some(cell) => &mut cell.text,
            None => &mut *self.out,
        }
    }

    fn open(&mut self, e: &BytesStart<'_>) {
        match e.local_name().as_ref() {
            b"p" | b"h" => {
                // Note bodies nest paragraphs inside paragraphs
                if self.paragraph_depth > 0 {
                    self.sink().soft_break();
                }
                self.paragraph_depth += 1;
            },
            b"page" => self.out.section_break(),
            b"table" => {
                self.table_depth += 1;
                if self.table_depth == 1 {
                    if self.tables_are_sections {
                        self.out.section_break();
                    } else {
                        self.out.end_block();
                    }
                }
            },
            b"table-row" if self.table_depth == 1 => {
                self.pending_empty = 0;
                self.row_has_content = false;
            },
            b"table-cell" | b"covered-table-cell" if self.table_depth == 1 => {
                self.cell = Some(Cell {
                    text: TextBuilder::default(),
                    repeat: columns_repeated(e),
                });
            },
            _ => {},
        }
    }

    fn empty(&mut self, e: &BytesStart<'_>) {
        match e.local_name().as_ref() {
            b"s" if self.paragraph_depth > 0 => {
                let count = local_attribute(e, b"c")
                    .and_then(|c| c.parse::<usize>().ok())
                    .unwrap_or(1)
                    .min(MAX_SPACES);
                let sink = self.sink();
                for _ in 0..count {
                    sink.push(' ');
                }
            },
            b"tab" | b"line-break" if self.cell.is_some() => self.sink().soft_break(),
            b"tab" if self.paragraph_depth > 0 => self.out.push('\t'),
            b"line-break" if self.paragraph_depth > 0 => self.out.end_paragraph(),
            b"p" | b"h" if self.cell.is_none() && self.paragraph_depth == 0 => {
                self.out.end_paragraph()
            },
            b"table-cell" | b"covered-table-cell" if self.table_depth == 1 => {
                self.pending_empty = self.pending_empty.saturating_add(columns_repeated(e));
            },
            _ => {},
        }
    }

    fn close(&mut self, name: &[u8]) {
        match name {
            b"p" | b"h" => {
                self.paragraph_depth = self.paragraph_depth.saturating_sub(1);
                if self.paragraph_depth > 0 || self.cell.is_some() {
                    self.sink().soft_break();
                } else {
                    self.out.end_paragraph();
                }
            },
            b"table-cell" | b"covered-table-cell" if self.table_depth == 1 => self.finish_cell(),
            b"table-row" if self.table_depth == 1 => {
                if self.row_has_content {
                    self.out.end_row();
                }
            },
            // Nested tables are flattened into the enclosing cell
            b"table-cell" | b"table-row" if self.table_depth > 1 => self.sink().soft_break(),
            b"table" => self.table_depth = self.table_depth.saturating_sub(1),
            _ => {},
        }
    }

    fn finish_cell(&mut self) {
        let Some(cell) = self.cell.take() else {
            return;
        };
        let text = cell.text.finish();
        if text.is_empty() {
            self.pending_empty = self.pending_empty.saturating_add(cell.repeat);
            return;
        }

        for _ in 0..self.pending_empty.min(MAX_COLUMNS) {
            self.out.end_cell();
        }
        self.pending_empty = 0;
        for _ in 0..cell.repeat.min(MAX_REPEATED_CELLS) {
            self.out.push_str(&text);
            self.out.end_cell();
        }
        self.row_has_content = true;
    }
}

fn columns_repeated(e: &BytesStart<'_>) -> usize {
    local_attribute(e, b"number-columns-repeated")
        .and_then(|n| n.parse::<usize>().ok())
        .unwrap_or(1)
        .max(1)
}
