//! Output assembly shared by the structured decoders.
//!
//! All decoders lay text out the same way: paragraphs end with `\n`, table
//! cells are separated by `\t`, rows end with `\n` and top-level sections
//! (slides, sheets, chapters, pages) are separated by a blank line.

/// Incrementally built extraction output.
#[derive(Debug, Default)]
pub struct TextBuilder {
    out: String,
}

impl TextBuilder {
    /// Create an empty builder with room for `capacity` bytes.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            out: String::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn push_str(&mut self, text: &str) {
        self.out.push_str(text);
    }

    #[inline]
    pub fn push(&mut self, ch: char) {
        self.out.push(ch);
    }

    /// Append markup text, collapsing whitespace runs into one space.
    ///
    /// Whitespace at the start of a line or after a space is dropped.
    pub fn push_collapsed(&mut self, text: &str) {
        for ch in text.chars() {
            if ch.is_whitespace() && ch != '\u{00A0}' {
                if !self.out.is_empty() && !self.out.ends_with(&[' ', '\t', '\n'][..]) {
                    self.out.push(' ');
                }
            } else {
                self.out.push(ch);
            }
        }
    }

    /// End the current line unless nothing was written since the last one.
    pub fn end_block(&mut self) {
        self.trim_end_matches(&[' ']);
        if !self.out.is_empty() && !self.out.ends_with('\n') {
            self.out.push('\n');
        }
    }

    /// End the current paragraph or line.
    #[inline]
    pub fn end_paragraph(&mut self) {
        self.out.push('\n');
    }

    /// Separate two paragraphs that share a table cell.
    pub fn soft_break(&mut self) {
        if !self.out.is_empty() && !self.out.ends_with(&[' ', '\t', '\n'][..]) {
            self.out.push(' ');
        }
    }

    /// End a table cell.
    pub fn end_cell(&mut self) {
        self.trim_end_matches(&[' ']);
        self.out.push('\t');
    }

    /// End a table row, dropping the separator after its last cell.
    pub fn end_row(&mut self) {
        if self.out.ends_with('\t') {
            self.out.pop();
        }
        self.out.push('\n');
    }

    /// Start a new top-level section (slide, sheet, chapter).
    ///
    /// Leaves exactly one blank line between sections and nothing before the
    /// first one.
    pub fn section_break(&mut self) {
        self.trim_end_matches(&[' ', '\t', '\n', '\r']);
        if !self.out.is_empty() {
            self.out.push_str("\n\n");
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.out.is_empty()
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.out
    }

    /// Finish the output, trimming trailing whitespace.
    pub fn finish(mut self) -> String {
        self.trim_end_matches(&[' ', '\t', '\n', '\r']);
        self.out
    }

    fn trim_end_matches(&mut self, chars: &[char]) {
        let len = self.out.trim_end_matches(chars).len();
        self.out.truncate(len);
    }
}
