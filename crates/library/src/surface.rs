//! The editable text the actions operate on.
//!
//! Positions are `(line, ch)` pairs with `ch` counted in characters, the way
//! editors report cursors. [`Buffer`] is a plain in-memory implementation
//! used by the command-line front end and in tests.

use std::fmt::{Display, Formatter, Result as FmtResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub ch: usize,
}

impl Position {
    pub const fn new(line: usize, ch: usize) -> Self {
        Self { line, ch }
    }
}

/// Half-open span between two positions. `start` never comes after `end`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    /// Builds a range from two positions in either order.
    pub fn new(a: Position, b: Position) -> Self {
        if a <= b { Self { start: a, end: b } } else { Self { start: b, end: a } }
    }

    pub fn caret(at: Position) -> Self {
        Self { start: at, end: at }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Host editor capabilities needed to read and rewrite a note.
pub trait TextSurface: Send {
    /// Currently selected text; empty when nothing is selected.
    fn selection(&self) -> String;
    fn selection_range(&self) -> Range;
    fn cursor(&self) -> Position;
    /// Text of line `n` without its terminator.
    fn line(&self, n: usize) -> Option<String>;
    /// Replaces `range` with `text` and leaves the cursor after it.
    fn replace_range(&mut self, text: &str, range: Range);

    fn replace_selection(&mut self, text: &str) {
        let range = self.selection_range();
        self.replace_range(text, range);
    }
}

/// A whole note held in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Buffer {
    text: String,
    selection: Range,
}

impl Buffer {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), selection: Range::default() }
    }

    /// Places a collapsed cursor.
    pub fn with_cursor(mut self, at: Position) -> Self {
        self.selection = Range::caret(self.clamp(at));
        self
    }

    pub fn with_selection(mut self, from: Position, to: Position) -> Self {
        self.selection = Range::new(self.clamp(from), self.clamp(to));
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    fn line_count(&self) -> usize {
        self.text.split('\n').count()
    }

    /// Pulls a position back inside the text.
    fn clamp(&self, at: Position) -> Position {
        let last = self.line_count() - 1;
        if at.line > last {
            let ch = self.line(last).map(|l| l.chars().count()).unwrap_or(0);
            return Position::new(last, ch);
        }
        let width = self.line(at.line).map(|l| l.chars().count()).unwrap_or(0);
        Position::new(at.line, at.ch.min(width))
    }

    /// Byte offset of a (clamped) position.
    fn offset(&self, at: Position) -> usize {
        let at = self.clamp(at);
        let mut offset = 0;
        for (n, line) in self.text.split('\n').enumerate() {
            if n == at.line {
                return offset + line.char_indices().nth(at.ch).map(|(i, _)| i).unwrap_or(line.len());
            }
            offset += line.len() + 1;
        }
        self.text.len()
    }
}

impl TextSurface for Buffer {
    fn selection(&self) -> String {
        self.text[self.offset(self.selection.start)..self.offset(self.selection.end)].to_string()
    }

    fn selection_range(&self) -> Range {
        self.selection
    }

    fn cursor(&self) -> Position {
        self.selection.end
    }

    fn line(&self, n: usize) -> Option<String> {
        self.text.split('\n').nth(n).map(|l| l.strip_suffix('\r').unwrap_or(l).to_string())
    }

    fn replace_range(&mut self, text: &str, range: Range) {
        let range = Range::new(self.clamp(range.start), self.clamp(range.end));
        let (from, to) = (self.offset(range.start), self.offset(range.end));
        self.text.replace_range(from..to, text);
        let end = match text.rsplit_once('\n') {
            Some((head, tail)) => {
                Position::new(range.start.line + head.matches('\n').count() + 1, tail.chars().count())
            },
            None => Position::new(range.start.line, range.start.ch + text.chars().count()),
        };
        self.selection = Range::caret(end);
    }
}

impl Display for Buffer {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_selection_text() {
        let buffer = Buffer::new("first line\nsecond line\nthird").with_selection(Position::new(1, 7), Position::new(2, 5));
        assert_eq!(buffer.selection(), "line\nthird");
        assert_eq!(buffer.cursor(), Position::new(2, 5));
    }

    #[test]
    fn test_backwards_selection_is_normalized() {
        let buffer = Buffer::new("abcdef").with_selection(Position::new(0, 4), Position::new(0, 1));
        assert_eq!(buffer.selection(), "bcd");
    }

    #[test]
    fn test_replace_selection_moves_cursor() {
        let mut buffer = Buffer::new("see: LINK here").with_selection(Position::new(0, 5), Position::new(0, 9));
        buffer.replace_selection("![[paperless-42.pdf]]");
        assert_eq!(buffer.text(), "see: ![[paperless-42.pdf]] here");
        assert_eq!(buffer.cursor(), Position::new(0, 26));
        assert!(buffer.selection().is_empty());
    }

    #[test]
    fn test_insert_at_cursor() {
        let mut buffer = Buffer::new("a\n\nc\n").with_cursor(Position::new(1, 0));
        buffer.replace_selection("b");
        assert_eq!(buffer.text(), "a\nb\nc\n");
    }

    #[test]
    fn test_multiline_replacement() {
        let mut buffer = Buffer::new("x").with_cursor(Position::new(0, 1));
        buffer.replace_selection("1\n22\n333");
        assert_eq!(buffer.text(), "x1\n22\n333");
        assert_eq!(buffer.cursor(), Position::new(2, 3));
    }

    #[rstest]
    #[case(Position::new(0, 99), Position::new(0, 3))]
    #[case(Position::new(9, 0), Position::new(1, 2))]
    #[case(Position::new(1, 1), Position::new(1, 1))]
    fn test_positions_are_clamped(#[case] requested: Position, #[case] expected: Position) {
        let buffer = Buffer::new("abc\nde").with_cursor(requested);
        assert_eq!(buffer.cursor(), expected);
    }

    #[test]
    fn test_multibyte_offsets() {
        let mut buffer = Buffer::new("größe ändern").with_selection(Position::new(0, 6), Position::new(0, 12));
        assert_eq!(buffer.selection(), "ändern");
        buffer.replace_selection("x");
        assert_eq!(buffer.text(), "größe x");
    }

    #[test]
    fn test_lines_strip_carriage_returns() {
        let buffer = Buffer::new("one\r\ntwo");
        assert_eq!(buffer.line(0).as_deref(), Some("one"));
        assert_eq!(buffer.line(1).as_deref(), Some("two"));
        assert_eq!(buffer.line(2), None);
    }
}
