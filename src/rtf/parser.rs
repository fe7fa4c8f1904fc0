//! RTF parser producing plain text.
//!
//! The parser keeps one [`State`] per open group. Destinations that hold no
//! document text (font table, pictures, field instructions, headers) are
//! lexed for nesting but produce no output. Field and object results are
//! text again, unless the field itself sits in a discarded destination. Literal and `\'hh` bytes are
//! buffered and decoded together with the codepage of the font in effect,
//! so multi-byte encodings split over several escapes decode correctly.

use super::error::{RtfError, RtfResult};
use super::lexer::{ControlWord, Lexer, Token};
use crate::common::encoding::{charset_to_codepage, decode_codepage, is_supported_codepage};
use crate::common::text_builder::TextBuilder;
use encoding_rs::WINDOWS_1252;
use phf::phf_set;
use smallvec::SmallVec;
use std::collections::HashMap;
use tracing::debug;

/// Default ANSI codepage.
const DEFAULT_CODEPAGE: u32 = 1252;

/// Destinations whose content is never document text.
static SKIPPED_DESTINATIONS: phf::Set<&'static str> = phf_set! {
    "header", "headerl", "headerr", "headerf",
    "footer", "footerl", "footerr", "footerf",
    "listtable", "listoverridetable", "revtbl", "rsidtbl",
    "generator", "xmlnstbl", "themedata", "colorschememapping",
    "datastore", "latentstyles", "pgdsctbl", "filetbl",
    "objdata", "objclass", "bkmkstart", "bkmkend",
};

/// Where the text of a group goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Destination {
    /// Document text
    Body,
    /// Font definitions
    FontTable,
    /// Field instruction or object data; a nested `\fldrslt` or `\result`
    /// group is document text
    Instruction,
    /// Discarded content, including any field results inside it
    Skip,
}

/// Formatting state of one group.
#[derive(Debug, Clone, Copy)]
struct State {
    destination: Destination,
    /// Number of fallback characters that follow each `\uN`
    unicode_skip: usize,
    /// Codepage of the font in effect
    codepage: u32,
    /// The group opened with `\*`
    ignorable: bool,
    /// No control word or text has been seen in this group yet
    fresh: bool,
}

/// RTF parser.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    max_depth: usize,
    states: Vec<State>,
    out: TextBuilder,
    /// Codepage set by `\ansicpg` or the character set words
    document_codepage: u32,
    /// Codepage of each font number, from the font table
    font_codepages: HashMap<i32, u32>,
    /// Font currently being defined inside the font table
    defining_font: i32,
    /// Undecoded codepage bytes
    pending_bytes: Vec<u8>,
    /// Undecoded UTF-16 code units from `\uN`
    pending_units: SmallVec<[u16; 4]>,
    /// Fallback characters still to drop after a `\uN`
    skip_remaining: usize,
}

impl<'a> Parser<'a> {
    /// Create a parser that rejects groups nested deeper than `max_depth`.
    pub fn new(input: &'a [u8], max_depth: usize) -> Self {
        Self {
            lexer: Lexer::new(input),
            max_depth,
            states: Vec::new(),
            out: TextBuilder::with_capacity(input.len() / 2),
            document_codepage: DEFAULT_CODEPAGE,
            font_codepages: HashMap::new(),
            defining_font: 0,
            pending_bytes: Vec::new(),
            pending_units: SmallVec::new(),
            skip_remaining: 0,
        }
    }

    /// Parse the whole document and return its text.
    pub fn parse(mut self) -> RtfResult<String> {
        self.expect_header()?;

        while !self.states.is_empty() {
            let token = self.lexer.next_token()?.ok_or(RtfError::UnexpectedEof)?;
            self.handle_token(token)?;
        }

        // Anything after the closing brace of the document is ignored
        Ok(self.out.finish())
    }

    fn expect_header(&mut self) -> RtfResult<()> {
        if self.lexer.next_token()? != Some(Token::OpenBrace) {
            return Err(RtfError::MissingHeader);
        }
        match self.lexer.next_token()? {
            Some(Token::Control(ControlWord::Rtf(_))) => {},
            _ => return Err(RtfError::MissingHeader),
        }
        self.states.push(State {
            destination: Destination::Body,
            unicode_skip: 1,
            codepage: DEFAULT_CODEPAGE,
            ignorable: false,
            fresh: false,
        });
        Ok(())
    }

    fn handle_token(&mut self, token: Token<'a>) -> RtfResult<()> {
        match token {
            Token::OpenBrace => self.open_group(),
            Token::CloseBrace => self.close_group(),
            Token::Text(bytes) => {
                self.mark_used();
                self.push_bytes(bytes);
                Ok(())
            },
            Token::HexByte(byte) => {
                self.mark_used();
                self.push_bytes(&[byte]);
                Ok(())
            },
            Token::Binary(_) => {
                self.mark_used();
                // Binary data counts as a single fallback character
                self.skip_remaining = self.skip_remaining.saturating_sub(1);
                Ok(())
            },
            Token::Control(word) => {
                self.handle_control(word);
                Ok(())
            },
        }
    }

    fn open_group(&mut self) -> RtfResult<()> {
        self.flush();
        self.skip_remaining = 0;

        if self.states.len() >= self.max_depth {
            return Err(RtfError::NestingTooDeep(self.max_depth));
        }
        let mut state = *self.current();
        state.ignorable = false;
        state.fresh = true;
        self.states.push(state);
        Ok(())
    }

    fn close_group(&mut self) -> RtfResult<()> {
        self.flush();
        self.skip_remaining = 0;
        self.states.pop().ok_or(RtfError::UnbalancedGroup)?;
        Ok(())
    }

    fn handle_control(&mut self, word: ControlWord<'a>) {
        let fresh = self.current().fresh;
        self.mark_used();

        if word == ControlWord::IgnorableDestination {
            if fresh {
                let state = self.current_mut();
                state.ignorable = true;
                state.fresh = true;
            }
            return;
        }

        // A `\*` group is skipped unless its destination is understood
        if fresh && self.current().ignorable && !is_known_destination(word) {
            self.set_destination(Destination::Skip);
            return;
        }

        match self.current().destination {
            Destination::Skip => {},
            Destination::Instruction => {
                if word == ControlWord::FieldResult || word == ControlWord::Result {
                    self.set_destination(Destination::Body);
                }
            },
            Destination::FontTable => self.handle_font_table_word(word),
            Destination::Body => self.handle_body_word(word),
        }
    }

    fn handle_font_table_word(&mut self, word: ControlWord<'a>) {
        match word {
            ControlWord::FontNumber(n) => self.defining_font = n,
            ControlWord::FontCharset(charset) => {
                if let Some(codepage) = charset_to_codepage(charset) {
                    self.font_codepages.insert(self.defining_font, codepage);
                }
            },
            ControlWord::FontCodePage(codepage) => {
                if let Ok(codepage) = u32::try_from(codepage)
                    && is_supported_codepage(codepage)
                {
                    self.font_codepages.insert(self.defining_font, codepage);
                }
            },
            _ => {},
        }
    }

    fn handle_body_word(&mut self, word: ControlWord<'a>) {
        match word {
            ControlWord::AnsiCodePage(codepage) => {
                if let Ok(codepage) = u32::try_from(codepage) {
                    self.set_document_codepage(codepage);
                }
            },
            ControlWord::Ansi => self.set_document_codepage(DEFAULT_CODEPAGE),
            ControlWord::Mac => self.set_document_codepage(10000),
            ControlWord::Pc => self.set_document_codepage(437),
            ControlWord::Pca => self.set_document_codepage(850),

            ControlWord::FontTable => self.set_destination(Destination::FontTable),
            ControlWord::Object | ControlWord::FieldInstruction => {
                self.set_destination(Destination::Instruction)
            },
            ControlWord::ColorTable
            | ControlWord::StyleSheet
            | ControlWord::Info
            | ControlWord::Picture => self.set_destination(Destination::Skip),
            ControlWord::Unknown(name, _) if SKIPPED_DESTINATIONS.contains(name) => {
                self.set_destination(Destination::Skip)
            },

            ControlWord::FontNumber(n) => {
                self.flush();
                let codepage = self
                    .font_codepages
                    .get(&n)
                    .copied()
                    .unwrap_or(self.document_codepage);
                self.current_mut().codepage = codepage;
            },
            ControlWord::UnicodeSkip(n) => {
                self.current_mut().unicode_skip = usize::try_from(n).unwrap_or(0);
            },
            ControlWord::Unicode(n) => {
                self.flush_bytes();
                // Values above 32767 are written as negative numbers
                let unit = if n < 0 { n + 65536 } else { n };
                self.pending_units.push(u16::try_from(unit).unwrap_or(0xFFFD));
                self.skip_remaining = self.current().unicode_skip;
            },

            ControlWord::Par | ControlWord::Line | ControlWord::Page | ControlWord::Section => {
                self.emit_break(TextBuilder::end_paragraph)
            },
            ControlWord::Tab => self.emit_char('\t'),
            ControlWord::Cell => self.emit_break(TextBuilder::end_cell),
            ControlWord::Row => self.emit_break(TextBuilder::end_row),
            ControlWord::Char(ch) => self.emit_char(ch),

            _ => {},
        }
    }

    fn set_document_codepage(&mut self, codepage: u32) {
        if !is_supported_codepage(codepage) {
            debug!(codepage, kept = self.document_codepage, "unsupported RTF codepage");
            return;
        }
        self.flush();
        self.document_codepage = codepage;
        self.current_mut().codepage = codepage;
    }

    fn set_destination(&mut self, destination: Destination) {
        self.flush();
        self.current_mut().destination = destination;
    }

    fn emit_char(&mut self, ch: char) {
        if self.skip_remaining > 0 {
            self.skip_remaining -= 1;
            return;
        }
        self.flush();
        self.out.push(ch);
    }

    fn emit_break(&mut self, apply: fn(&mut TextBuilder)) {
        self.flush();
        self.skip_remaining = 0;
        apply(&mut self.out);
    }

    fn push_bytes(&mut self, mut bytes: &[u8]) {
        if self.skip_remaining > 0 {
            let skipped = self.skip_remaining.min(bytes.len());
            self.skip_remaining -= skipped;
            bytes = &bytes[skipped..];
        }
        if bytes.is_empty() || self.current().destination != Destination::Body {
            return;
        }
        self.flush_units();
        self.pending_bytes.extend_from_slice(bytes);
    }

    fn flush(&mut self) {
        self.flush_bytes();
        self.flush_units();
    }

    fn flush_bytes(&mut self) {
        if self.pending_bytes.is_empty() {
            return;
        }
        match decode_codepage(&self.pending_bytes, self.current().codepage) {
            Some(text) => self.out.push_str(&text),
            None => {
                let (text, _, _) = WINDOWS_1252.decode(&self.pending_bytes);
                self.out.push_str(&text);
            },
        }
        self.pending_bytes.clear();
    }

    fn flush_units(&mut self) {
        if self.pending_units.is_empty() {
            return;
        }
        if self.current().destination == Destination::Body {
            for ch in char::decode_utf16(self.pending_units.iter().copied()) {
                self.out.push(ch.unwrap_or(char::REPLACEMENT_CHARACTER));
            }
        }
        self.pending_units.clear();
    }

    fn mark_used(&mut self) {
        if let Some(state) = self.states.last_mut() {
            state.fresh = false;
        }
    }

    fn current(&self) -> &State {
        // The root state lives until the final closing brace ends the loop
        &self.states[self.states.len() - 1]
    }

    fn current_mut(&mut self) -> &mut State {
        let last = self.states.len() - 1;
        &mut self.states[last]
    }
}

/// Destinations that are read even when flagged with `\*`.
fn is_known_destination(word: ControlWord<'_>) -> bool {
    matches!(
        word,
        ControlWord::FieldInstruction | ControlWord::FieldResult | ControlWord::FontTable
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> RtfResult<String> {
        Parser::new(input.as_bytes(), 64).parse()
    }

    #[test]
    fn test_plain_paragraphs() {
        let text = parse(r"{\rtf1\ansi\deff0 {\fonttbl{\f0 Arial;}}Hello\par World\par}").unwrap();
        assert_eq!(text, "Hello\nWorld");
    }

    #[test]
    fn test_header_groups_are_skipped() {
        let text = parse(
            r"{\rtf1{\colortbl;\red255\green0\blue0;}{\stylesheet{\s0 Normal;}}{\info{\title T}}{\*\generator Writer;}Body}",
        )
        .unwrap();
        assert_eq!(text, "Body");
    }

    #[test]
    fn test_unicode_with_fallback() {
        let text = parse(r"{\rtf1\uc1 caf\u233?\par\uc0\u8364 x}").unwrap();
        assert_eq!(text, "caf\u{e9}\n\u{20ac}x");
        // Negative values and surrogate pairs
        assert_eq!(parse(r"{\rtf1 \u-10179?\u-8694?}").unwrap(), "\u{1F60A}");
    }

    #[test]
    fn test_hex_escapes_use_font_charset() {
        let text = parse(
            r"{\rtf1\ansi{\fonttbl{\f0\fcharset0 Arial;}{\f1\fcharset204 Times;}}\f0 caf\'e9 \f1\'cf\'f0\'e8}",
        )
        .unwrap();
        assert_eq!(text, "caf\u{e9} \u{41f}\u{440}\u{438}");
    }

    #[test]
    fn test_ansicpg_double_byte() {
        let text = parse(r"{\rtf1\ansi\ansicpg932 \'82\'a0}").unwrap();
        assert_eq!(text, "\u{3042}");
    }

    #[test]
    fn test_fields_keep_result() {
        let text = parse(
            r#"{\rtf1 See {\field{\*\fldinst HYPERLINK "http://example.com"}{\fldrslt example}} now}"#,
        )
        .unwrap();
        assert_eq!(text, "See example now");
    }

    #[test]
    fn test_object_keeps_result() {
        let text = parse(r"{\rtf1{\object\objemb{\*\objdata 0102}{\result shown}}}").unwrap();
        assert_eq!(text, "shown");
    }

    #[test]
    fn test_fields_in_headers_and_footers_are_dropped() {
        let header = parse(r"{\rtf1{\header{\field{\*\fldinst PAGE}{\fldrslt 7}}}Body\par}").unwrap();
        assert_eq!(header, "Body");
        let footer = parse(r"{\rtf1{\footer Page {\field{\*\fldinst PAGE}{\fldrslt 3}}}Body}").unwrap();
        assert_eq!(footer, "Body");
        let generator = parse(r"{\rtf1{\*\generator {\fldrslt x}}Body}").unwrap();
        assert_eq!(generator, "Body");
    }

    #[test]
    fn test_dos_codepages() {
        assert_eq!(parse(r"{\rtf1\pc caf\'82}").unwrap(), "caf\u{e9}");
        assert_eq!(parse(r"{\rtf1\pca caf\'82 \'9b}").unwrap(), "caf\u{e9} \u{f8}");
        let font = parse(r"{\rtf1{\fonttbl{\f0\fcharset255 Terminal;}}\f0 caf\'82}").unwrap();
        assert_eq!(font, "caf\u{e9}");
    }

    #[test]
    fn test_unsupported_codepage_keeps_previous() {
        assert_eq!(parse(r"{\rtf1\ansicpg99999 caf\'e9}").unwrap(), "caf\u{e9}");
    }

    #[test]
    fn test_table_cells() {
        let text = parse(r"{\rtf1\trowd A\cell B\cell\row\trowd C\cell D\cell\row}").unwrap();
        assert_eq!(text, "A\tB\nC\tD");
    }

    #[test]
    fn test_special_characters() {
        let text = parse(r"{\rtf1 a\tab b\emdash c\~d\{e\}}").unwrap();
        assert_eq!(text, "a\tb\u{2014}c\u{a0}d{e}");
    }

    #[test]
    fn test_binary_is_skipped() {
        let text = parse("{\\rtf1{\\pict\\bin4 }}}}}after}").unwrap();
        assert_eq!(text, "after");
    }

    #[test]
    fn test_truncated_document() {
        assert_eq!(parse(r"{\rtf1 Hello {\b world"), Err(RtfError::UnexpectedEof));
    }

    #[test]
    fn test_missing_header() {
        assert_eq!(parse("plain"), Err(RtfError::MissingHeader));
        assert_eq!(parse(r"{\ansi x}"), Err(RtfError::MissingHeader));
    }

    #[test]
    fn test_nesting_limit() {
        let deep = format!("{{\\rtf1 {}x{}}}", "{".repeat(10), "}".repeat(10));
        assert_eq!(
            Parser::new(deep.as_bytes(), 4).parse(),
            Err(RtfError::NestingTooDeep(4))
        );
        assert_eq!(Parser::new(deep.as_bytes(), 64).parse().unwrap(), "x");
    }

    #[test]
    fn test_trailing_content_ignored() {
        assert_eq!(parse("{\\rtf1 done}\r\n\0\0").unwrap(), "done");
    }
}
