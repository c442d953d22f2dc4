//! Line and column positions inside a source file.

use serde::Serialize;

/// A 1-based line and column.
///
/// Line `0` means the position is unknown, as for definitions declared in
/// code rather than in a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
pub struct SourceLocation {
    /// Line number.
    pub line: usize,
    /// Column number, counted in characters.
    pub column: usize,
}

impl SourceLocation {
    /// Create a location.
    #[must_use]
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Location `chars` characters further along the same line.
    #[must_use]
    pub const fn advance(self, chars: usize) -> Self {
        Self {
            line: self.line,
            column: self.column + chars,
        }
    }
}

/// An inclusive range between two locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct TextRange {
    /// First character.
    pub start: SourceLocation,
    /// Last character (inclusive).
    pub end: SourceLocation,
}

impl TextRange {
    /// Range covering `text` when it starts at `start` on a single line.
    ///
    /// # Examples
    /// ```
    /// use autostep_linker::{SourceLocation, TextRange};
    ///
    /// let range = TextRange::of_text(SourceLocation::new(3, 5), "hello");
    /// assert_eq!(range.end, SourceLocation::new(3, 9));
    /// ```
    #[must_use]
    pub fn of_text(start: SourceLocation, text: &str) -> Self {
        let chars = text.chars().count();
        Self {
            start,
            end: start.advance(chars.saturating_sub(1)),
        }
    }

    /// Single-character range.
    #[must_use]
    pub const fn point(location: SourceLocation) -> Self {
        Self {
            start: location,
            end: location,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_collapses_to_start() {
        let start = SourceLocation::new(1, 4);
        assert_eq!(TextRange::of_text(start, ""), TextRange::point(start));
    }

    #[test]
    fn counts_characters_not_bytes() {
        let range = TextRange::of_text(SourceLocation::new(2, 1), "café");
        assert_eq!(range.end.column, 4);
    }
}
