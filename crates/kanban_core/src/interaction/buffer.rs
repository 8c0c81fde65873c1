//! Text entry for task drafts.
//!
//! # Responsibility
//! - Hold the title or description being typed and its cursor.
//!
//! # Invariants
//! - `cursor` counts chars, not bytes, and stays within `0..=input.chars().count()`.
//! - Edits always land on a char boundary, so multi-byte input never splits.

use serde::Serialize;

/// Single-line edit buffer with a cursor counted in chars.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TextBuffer {
    input: String,
    cursor: usize,
}

impl TextBuffer {
    /// Buffer pre-filled with `input`, cursor at the end.
    pub fn new(input: impl Into<String>) -> Self {
        let input = input.into();
        let cursor = input.chars().count();
        Self { input, cursor }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.input
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Convert a char index to a byte index.
    fn byte_offset(&self, char_idx: usize) -> usize {
        self.input
            .char_indices()
            .nth(char_idx)
            .map(|(i, _)| i)
            .unwrap_or(self.input.len())
    }

    pub fn insert(&mut self, c: char) {
        let byte_idx = self.byte_offset(self.cursor);
        self.input.insert(byte_idx, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            let byte_idx = self.byte_offset(self.cursor - 1);
            self.input.remove(byte_idx);
            self.cursor -= 1;
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.input.chars().count() {
            self.cursor += 1;
        }
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.input.chars().count();
    }
}

#[cfg(test)]
mod tests {
    use super::TextBuffer;

    #[test]
    fn insert_and_backspace_respect_multibyte_chars() {
        let mut buf = TextBuffer::new("héllo");
        buf.home();
        buf.move_right();
        buf.move_right();
        buf.backspace();
        assert_eq!(buf.as_str(), "hllo");
        buf.insert('é');
        assert_eq!(buf.as_str(), "héllo");
        assert_eq!(buf.cursor(), 2);
    }

    #[test]
    fn cursor_stays_within_bounds() {
        let mut buf = TextBuffer::new("ab");
        buf.move_right();
        assert_eq!(buf.cursor(), 2);
        buf.home();
        buf.move_left();
        buf.backspace();
        assert_eq!(buf.cursor(), 0);
        assert_eq!(buf.as_str(), "ab");
        buf.end();
        buf.insert('c');
        assert_eq!(buf.as_str(), "abc");
    }
}
