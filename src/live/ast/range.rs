//! Position and location tracking for source code locations
//!
//! Lexer tokens carry byte spans. The parser turns the spans of literals and identifiers into
//! [`Range`] values so that key derivation can ask "which line is this on" without going back
//! to the source text.
//!
//! ## Types
//!
//! - [`Position`] - A 0-based line:column position in source code
//! - [`Range`] - A source code range with start/end positions and byte span
//! - [`SourceLocation`] - Utility for converting byte offsets to positions
//!
//! Locations are metadata only. Two trees that differ only in locations are structurally equal.

use std::fmt;
use std::ops::Range as ByteRange;

/// Represents a position in source code (line and column, both 0-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// 1-based line number, as editors display it
    pub fn line_number(&self) -> usize {
        self.line + 1
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line_number(), self.column)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

/// Represents a location in source code (start and end positions)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Range {
    pub span: ByteRange<usize>,
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(span: ByteRange<usize>, start: Position, end: Position) -> Self {
        Self { span, start, end }
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl Default for Range {
    fn default() -> Self {
        Self::new(
            ByteRange { start: 0, end: 0 },
            Position::default(),
            Position::default(),
        )
    }
}

/// Provides fast conversion from byte offsets to line/column positions
#[derive(Debug, Clone)]
pub struct SourceLocation {
    /// Byte offsets where each line starts
    line_starts: Vec<usize>,
}

impl SourceLocation {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];

        for (byte_pos, ch) in source.char_indices() {
            if ch == '\n' {
                line_starts.push(byte_pos + 1);
            }
        }

        Self { line_starts }
    }

    /// Convert a byte offset to a line/column position
    pub fn byte_to_position(&self, byte_offset: usize) -> Position {
        let line = self
            .line_starts
            .binary_search(&byte_offset)
            .unwrap_or_else(|i| i - 1);

        let column = byte_offset - self.line_starts[line];

        Position::new(line, column)
    }

    /// Convert a byte range to a location
    pub fn byte_range_to_ast_range(&self, range: &ByteRange<usize>) -> Range {
        Range::new(
            range.clone(),
            self.byte_to_position(range.start),
            self.byte_to_position(range.end),
        )
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_display_is_one_based() {
        assert_eq!(Position::new(0, 4).to_string(), "1:4");
        assert_eq!(Position::new(2, 0).line_number(), 3);
    }

    #[test]
    fn test_byte_to_position_single_line() {
        let loc = SourceLocation::new("let a = 1;");
        assert_eq!(loc.byte_to_position(0), Position::new(0, 0));
        assert_eq!(loc.byte_to_position(8), Position::new(0, 8));
    }

    #[test]
    fn test_byte_to_position_multiline() {
        let loc = SourceLocation::new("let a = 1;\nlet b = 2;\n");
        assert_eq!(loc.line_count(), 3);
        assert_eq!(loc.byte_to_position(11), Position::new(1, 0));
        assert_eq!(loc.byte_to_position(19), Position::new(1, 8));
    }

    #[test]
    fn test_byte_range_to_ast_range() {
        let loc = SourceLocation::new("a\nbc");
        let range = loc.byte_range_to_ast_range(&(2..4));
        assert_eq!(range.start, Position::new(1, 0));
        assert_eq!(range.end, Position::new(1, 2));
        assert_eq!(range.to_string(), "2:0..2:2");
    }

    #[test]
    fn test_unicode_offsets() {
        let loc = SourceLocation::new("'é'\nx");
        // 'é' is two bytes, so the newline sits at byte 4
        assert_eq!(loc.byte_to_position(5), Position::new(1, 0));
    }
}
