//! RTF lexer/tokenizer.
//!
//! The lexer works on raw bytes and hands out slices of the input, so text
//! runs are never copied before the parser decodes them with the codepage
//! in effect.

use super::error::{RtfError, RtfResult};
use phf::phf_map;

/// Longest numeric parameter accepted, in digits.
const MAX_PARAM_DIGITS: usize = 10;

/// Control words that stand for a single character.
static SYMBOL_WORDS: phf::Map<&'static str, char> = phf_map! {
    "emdash" => '\u{2014}',
    "endash" => '\u{2013}',
    "emspace" => '\u{2003}',
    "enspace" => '\u{2002}',
    "qmspace" => '\u{2005}',
    "bullet" => '\u{2022}',
    "lquote" => '\u{2018}',
    "rquote" => '\u{2019}',
    "ldblquote" => '\u{201C}',
    "rdblquote" => '\u{201D}',
    "zwj" => '\u{200D}',
    "zwnj" => '\u{200C}',
    "ltrmark" => '\u{200E}',
    "rtlmark" => '\u{200F}',
};

/// Control word with optional parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlWord<'a> {
    // Document structure
    Rtf(i32),
    AnsiCodePage(i32),
    Ansi,
    Mac,
    Pc,
    Pca,

    // Header groups
    FontTable,
    ColorTable,
    StyleSheet,
    Info,

    // Embedded content
    Picture,
    Object,
    Result,

    // Fields
    Field,
    FieldInstruction,
    FieldResult,

    // Fonts
    FontNumber(i32),
    FontCharset(i32),
    FontCodePage(i32),

    // Breaks
    Par,
    Line,
    Page,
    Section,
    Tab,
    Cell,
    Row,

    // Unicode
    Unicode(i32),
    UnicodeSkip(i32),

    /// A character given by name (`\emdash`) or symbol (`\~`)
    Char(char),

    /// `\*`: the group is a destination a reader may ignore
    IgnorableDestination,

    /// Any other control word or symbol
    Unknown(&'a str, Option<i32>),
}

/// Token types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// Opening brace
    OpenBrace,
    /// Closing brace
    CloseBrace,
    /// Control word
    Control(ControlWord<'a>),
    /// Run of literal bytes in the document codepage
    Text(&'a [u8]),
    /// A byte given as `\'hh`
    HexByte(u8),
    /// Payload of `\binN`
    Binary(&'a [u8]),
}

/// RTF Lexer.
pub struct Lexer<'a> {
    /// Source input
    input: &'a [u8],
    /// Current position in bytes
    pos: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer.
    #[inline]
    pub fn new(input: &'a [u8]) -> Self {
        Self { input, pos: 0 }
    }

    /// Get the next token, or `None` at the end of the input.
    pub fn next_token(&mut self) -> RtfResult<Option<Token<'a>>> {
        // Line breaks and NULs in the source carry no meaning
        while let Some(b'\r' | b'\n' | 0) = self.peek() {
            self.pos += 1;
        }

        let Some(byte) = self.peek() else {
            return Ok(None);
        };

        let token = match byte {
            b'{' => {
                self.pos += 1;
                Token::OpenBrace
            },
            b'}' => {
                self.pos += 1;
                Token::CloseBrace
            },
            b'\\' => self.parse_control()?,
            _ => self.parse_text(),
        };

        Ok(Some(token))
    }

    /// Parse a control word or control symbol.
    fn parse_control(&mut self) -> RtfResult<Token<'a>> {
        self.pos += 1; // Skip '\'

        let Some(byte) = self.peek() else {
            return Err(RtfError::UnexpectedEof);
        };

        if !byte.is_ascii_alphabetic() {
            self.pos += 1;
            let symbol = match byte {
                b'\\' | b'{' | b'}' => return Ok(Token::Text(&self.input[self.pos - 1..self.pos])),
                b'\'' => return self.parse_hex_byte(),
                b'*' => ControlWord::IgnorableDestination,
                b'\r' | b'\n' => ControlWord::Par,
                b'~' => ControlWord::Char('\u{00A0}'), // Non-breaking space
                b'-' => ControlWord::Char('\u{00AD}'), // Optional hyphen
                b'_' => ControlWord::Char('\u{2011}'), // Non-breaking hyphen
                b'\t' => ControlWord::Tab,
                _ => ControlWord::Unknown("", None),
            };
            return Ok(Token::Control(symbol));
        }

        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_alphabetic()) {
            self.pos += 1;
        }
        // Only ASCII letters were consumed
        let word = std::str::from_utf8(&self.input[start..self.pos]).unwrap_or_default();

        let param = self.parse_numeric_parameter(word)?;

        // A single space delimits the control word and is part of it
        if self.peek() == Some(b' ') {
            self.pos += 1;
        }

        if word == "bin" {
            let len = param.unwrap_or(0).max(0) as usize;
            let end = self
                .pos
                .checked_add(len)
                .filter(|&end| end <= self.input.len())
                .ok_or(RtfError::UnexpectedEof)?;
            let data = &self.input[self.pos..end];
            self.pos = end;
            return Ok(Token::Binary(data));
        }

        Ok(Token::Control(match_control_word(word, param)))
    }

    /// Parse numeric parameter after control word.
    fn parse_numeric_parameter(&mut self, word: &str) -> RtfResult<Option<i32>> {
        let start = self.pos;
        if self.peek() == Some(b'-') {
            self.pos += 1;
        }
        let digits_start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }

        if self.pos == digits_start {
            // A lone '-' is not a parameter
            self.pos = start;
            return Ok(None);
        }
        if self.pos - digits_start > MAX_PARAM_DIGITS {
            return Err(RtfError::InvalidControlWord(format!(
                "parameter of \\{} too long",
                word
            )));
        }

        // Only '-' and ASCII digits were consumed
        let text = std::str::from_utf8(&self.input[start..self.pos]).unwrap_or_default();
        text.parse::<i64>()
            .ok()
            .and_then(|value| i32::try_from(value).ok())
            .map(Some)
            .ok_or_else(|| {
                RtfError::InvalidControlWord(format!("parameter of \\{} out of range", word))
            })
    }

    /// Parse hexadecimal character escape (\').
    fn parse_hex_byte(&mut self) -> RtfResult<Token<'a>> {
        let digits = self
            .input
            .get(self.pos..self.pos + 2)
            .ok_or(RtfError::UnexpectedEof)?;
        let value = std::str::from_utf8(digits)
            .ok()
            .and_then(|hex| u8::from_str_radix(hex, 16).ok())
            .ok_or_else(|| {
                RtfError::InvalidHex(String::from_utf8_lossy(digits).into_owned())
            })?;
        self.pos += 2;
        Ok(Token::HexByte(value))
    }

    /// Parse plain text until a special byte or line break.
    fn parse_text(&mut self) -> Token<'a> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|b| !matches!(b, b'\\' | b'{' | b'}' | b'\r' | b'\n' | 0))
        {
            self.pos += 1;
        }
        Token::Text(&self.input[start..self.pos])
    }

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }
}

/// Match control word string to enum variant.
fn match_control_word(word: &str, param: Option<i32>) -> ControlWord<'_> {
    let param_value = param.unwrap_or(0);

    match word {
        // Document
        "rtf" => ControlWord::Rtf(param.unwrap_or(1)),
        "ansi" => ControlWord::Ansi,
        "ansicpg" => ControlWord::AnsiCodePage(param_value),
        "mac" => ControlWord::Mac,
        "pc" => ControlWord::Pc,
        "pca" => ControlWord::Pca,

        // Headers
        "fonttbl" => ControlWord::FontTable,
        "colortbl" => ControlWord::ColorTable,
        "stylesheet" => ControlWord::StyleSheet,
        "info" => ControlWord::Info,

        // Embedded content
        "pict" => ControlWord::Picture,
        "object" => ControlWord::Object,
        "result" => ControlWord::Result,

        // Fields
        "field" => ControlWord::Field,
        "fldinst" => ControlWord::FieldInstruction,
        "fldrslt" => ControlWord::FieldResult,

        // Fonts
        "f" => ControlWord::FontNumber(param_value),
        "fcharset" => ControlWord::FontCharset(param_value),
        "cpg" => ControlWord::FontCodePage(param_value),

        // Breaks
        "par" => ControlWord::Par,
        "line" => ControlWord::Line,
        "page" => ControlWord::Page,
        "sect" => ControlWord::Section,
        "tab" => ControlWord::Tab,
        "cell" | "nestcell" => ControlWord::Cell,
        "row" | "nestrow" => ControlWord::Row,

        // Unicode
        "u" => ControlWord::Unicode(param_value),
        "uc" => ControlWord::UnicodeSkip(param.unwrap_or(1)),

        _ => match SYMBOL_WORDS.get(word) {
            Some(ch) => ControlWord::Char(*ch),
            None => ControlWord::Unknown(word, param),
        },
    }
}
