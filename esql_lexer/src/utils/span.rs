//! Source location tracking for ES|QL queries
//!
//! Offsets are byte offsets into the UTF-8 query text; lines and columns are
//! 1-based and columns count characters, so a multi-byte character or a tab
//! advances the column by exactly one.
use serde::{Deserialize, Serialize};
use std::fmt;

/// A position in source text with line, column, and byte offset.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Position {
    /// Byte offset from start of input (0-based)
    pub offset: usize,
    /// Line number (1-based)
    pub line: u32,
    /// Column number (1-based)
    pub column: u32,
}

impl Position {
    pub fn new(offset: usize, line: u32, column: u32) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }

    /// Create the starting position (offset 0, line 1, column 1)
    pub fn start() -> Self {
        Self {
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    /// Advance position by one character
    pub fn advance(self, ch: char) -> Self {
        match ch {
            '\n' => Self {
                offset: self.offset + 1,
                line: self.line + 1,
                column: 1,
            },
            _ => Self {
                offset: self.offset + ch.len_utf8(),
                line: self.line,
                column: self.column + 1,
            },
        }
    }

    /// Advance position over every character of `s`
    pub fn advance_str(self, s: &str) -> Self {
        s.chars().fold(self, |pos, ch| pos.advance(ch))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A span of source text from start to end position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    /// Start position (inclusive)
    pub start: Position,
    /// End position (exclusive)
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        debug_assert!(
            start.offset <= end.offset,
            "Span start must not be after end"
        );
        Self { start, end }
    }

    /// Zero-width span at a position (used for the end-of-input token)
    pub fn empty_at(pos: Position) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    /// Combine this span with another to create a span that covers both
    pub fn merge(self, other: Self) -> Self {
        let start = if self.start.offset < other.start.offset {
            self.start
        } else {
            other.start
        };
        let end = if self.end.offset > other.end.offset {
            self.end
        } else {
            other.end
        };
        Self { start, end }
    }

    /// Byte length of this span
    pub fn len(&self) -> usize {
        self.end.offset - self.start.offset
    }

    pub fn is_empty(&self) -> bool {
        self.start.offset == self.end.offset
    }

    /// Check if this span contains a position
    pub fn contains(&self, pos: Position) -> bool {
        pos.offset >= self.start.offset && pos.offset < self.end.offset
    }

    /// Source text covered by this span, or `None` when it does not fit `input`
    pub fn slice<'a>(&self, input: &'a str) -> Option<&'a str> {
        input.get(self.start.offset..self.end.offset)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start.line == self.end.line {
            write!(
                f,
                "{}:{}-{}",
                self.start.line, self.start.column, self.end.column
            )
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// A value with its source location
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Spanned<T> {
    pub value: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(value: T, span: Span) -> Self {
        Self { value, span }
    }

    /// Map the value while preserving the span
    pub fn map<U, F>(self, f: F) -> Spanned<U>
    where
        F: FnOnce(T) -> U,
    {
        Spanned {
            value: f(self.value),
            span: self.span,
        }
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T: fmt::Display> fmt::Display for Spanned<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.value, self.span.start)
    }
}

/// Line index over a query for position lookup and caret diagnostics
#[derive(Debug, Clone)]
pub struct SourceMap {
    pub source: String,
    /// Byte offsets of line starts
    line_starts: Vec<usize>,
}

impl SourceMap {
    pub fn new(source: String) -> Self {
        let mut line_starts = vec![0];
        for (offset, ch) in source.char_indices() {
            if ch == '\n' {
                line_starts.push(offset + 1);
            }
        }
        Self {
            source,
            line_starts,
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Line and column for a byte offset; offsets past the end clamp to the end
    pub fn position_at(&self, offset: usize) -> Position {
        let mut offset = offset.min(self.source.len());
        while !self.source.is_char_boundary(offset) {
            offset -= 1;
        }

        let line = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i.saturating_sub(1),
        };
        let line_start = self.line_starts.get(line).copied().unwrap_or(0);
        let column = self.source[line_start..offset].chars().count();

        Position::new(offset, (line + 1) as u32, (column + 1) as u32)
    }

    /// Get a line of text by line number (1-based), without its terminator
    pub fn get_line(&self, line_num: u32) -> Option<&str> {
        let line_idx = (line_num as usize).checked_sub(1)?;
        let start = *self.line_starts.get(line_idx)?;
        let end = self
            .line_starts
            .get(line_idx + 1)
            .map(|next| next - 1)
            .unwrap_or(self.source.len());

        Some(self.source[start..end].trim_end_matches(['\n', '\r']))
    }

    /// Format an error message with the offending line and a caret underline
    pub fn format_error(&self, span: &Span, message: &str) -> String {
        let mut result = String::new();

        result.push_str(&format!("Error: {}\n", message));
        result.push_str(&format!(
            "  --> {}:{}\n",
            span.start.line, span.start.column
        ));

        if let Some(line) = self.get_line(span.start.line) {
            let line_num_str = span.start.line.to_string();
            let padding = " ".repeat(line_num_str.len());

            result.push_str(&format!("   {} |\n", padding));
            result.push_str(&format!("{} | {}\n", line_num_str, line));

            let mut underline = format!("   {} | ", padding);
            for _ in 1..span.start.column {
                underline.push(' ');
            }

            let line_width = line.chars().count() as u32;
            let caret_len = if span.start.line == span.end.line {
                span.end.column.saturating_sub(span.start.column)
            } else {
                (line_width + 1).saturating_sub(span.start.column)
            };

            for _ in 0..caret_len.max(1) {
                underline.push('^');
            }

            result.push_str(&underline);
            result.push('\n');
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_advance_counts_characters() {
        let pos = Position::start().advance_str("a\tb");
        assert_eq!(pos, Position::new(3, 1, 4));

        let pos = Position::start().advance_str("é\nx");
        assert_eq!(pos.offset, 4);
        assert_eq!(pos.line, 2);
        assert_eq!(pos.column, 2);
    }

    #[test]
    fn test_source_map_positions() {
        let map = SourceMap::new("FROM a\n| WHERE b".to_string());
        assert_eq!(map.line_count(), 2);
        assert_eq!(map.position_at(0), Position::new(0, 1, 1));
        assert_eq!(map.position_at(7), Position::new(7, 2, 1));
        assert_eq!(map.position_at(9), Position::new(9, 2, 3));
        assert_eq!(map.position_at(999).offset, 16);
    }

    #[test]
    fn test_get_line_strips_terminators() {
        let map = SourceMap::new("ROW a = 1\r\n| KEEP a".to_string());
        assert_eq!(map.get_line(1), Some("ROW a = 1"));
        assert_eq!(map.get_line(2), Some("| KEEP a"));
        assert_eq!(map.get_line(0), None);
        assert_eq!(map.get_line(3), None);
    }

    #[test]
    fn test_format_error_underlines_span() {
        let source = "ROW x = $";
        let map = SourceMap::new(source.to_string());
        let start = map.position_at(8);
        let span = Span::new(start, start.advance('$'));

        let rendered = map.format_error(&span, "Unrecognized character '$'");
        assert!(rendered.contains("--> 1:9"));
        assert!(rendered.contains("1 | ROW x = $"));
        assert!(rendered.ends_with("        ^\n"));
    }

    #[test]
    fn test_span_merge_and_slice() {
        let a = Span::new(Position::new(0, 1, 1), Position::new(4, 1, 5));
        let b = Span::new(Position::new(5, 1, 6), Position::new(9, 1, 10));
        let merged = a.merge(b);
        assert_eq!(merged.len(), 9);
        assert_eq!(merged.slice("FROM logs"), Some("FROM logs"));
        assert!(merged.contains(Position::new(4, 1, 5)));
        assert!(Span::empty_at(Position::start()).is_empty());
    }
}
