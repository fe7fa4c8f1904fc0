//! Conversion of Word's in-text control characters to plain text.

use crate::common::text_builder::TextBuilder;
use smallvec::SmallVec;

const CELL_MARK: char = '\u{07}';
const FIELD_BEGIN: char = '\u{13}';
const FIELD_SEPARATOR: char = '\u{14}';
const FIELD_END: char = '\u{15}';

/// Lay out raw document text.
///
/// Paragraph, line, page and section marks become line breaks, cell marks
/// become tabs (a second consecutive mark ends the row), non-breaking hyphens
/// become `-` and optional hyphens are dropped. Of a field only its result is
/// kept; the instruction text between the begin and separator marks is
/// discarded.
pub fn normalize(raw: &str) -> String {
    let mut out = TextBuilder::with_capacity(raw.len());
    // One entry per open field: whether its result part has started
    let mut fields: SmallVec<[bool; 4]> = SmallVec::new();
    let mut previous = '\0';

    for ch in raw.chars() {
        match ch {
            FIELD_BEGIN => fields.push(false),
            FIELD_SEPARATOR => {
                if let Some(in_result) = fields.last_mut() {
                    *in_result = true;
                }
            },
            FIELD_END => {
                fields.pop();
            },
            _ if fields.iter().any(|in_result| !in_result) => {},
            '\r' | '\u{0B}' | '\u{0C}' => out.end_paragraph(),
            CELL_MARK if previous == CELL_MARK => out.end_row(),
            CELL_MARK => out.end_cell(),
            '\u{1E}' => out.push('-'),
            // Optional hyphen, picture and drawn object anchors
            '\u{1F}' | '\u{01}' | '\u{08}' => {},
            other => out.push(other),
        }
        previous = ch;
    }

    out.finish()
}
