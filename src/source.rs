//! Code-point buffer the matcher runs over.

use std::fmt;

/// Sentinel appended after the last code point. It lies outside the Unicode
/// range, so no real input can produce it.
pub const END_OF_BUFFER: u32 = 0x11_0000;

/// 1-based line, 0-based column (in code points from the start of the line).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextPosition {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for TextPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {} col {}", self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    code_points: Vec<u32>,
}

impl Source {
    pub fn new(input: &str) -> Self {
        let mut code_points: Vec<u32> = input.chars().map(u32::from).collect();
        code_points.push(END_OF_BUFFER);
        Self { code_points }
    }

    /// Number of code points, not counting the sentinel.
    pub fn len(&self) -> usize {
        self.code_points.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Code point at `offset`. Offsets at or past the end yield the sentinel.
    #[inline]
    pub fn at(&self, offset: usize) -> u32 {
        self.code_points
            .get(offset)
            .copied()
            .unwrap_or(END_OF_BUFFER)
    }

    pub fn text(&self, begin: usize, end: usize) -> String {
        let end = end.min(self.len());
        let begin = begin.min(end);
        self.code_points[begin..end]
            .iter()
            .filter_map(|&c| char::from_u32(c))
            .collect()
    }

    pub fn position(&self, offset: usize) -> TextPosition {
        let offset = offset.min(self.len());
        let mut line = 1;
        let mut column = 0;
        for &c in &self.code_points[..offset] {
            if c == u32::from('\n') {
                line += 1;
                column = 0;
            } else {
                column += 1;
            }
        }
        TextPosition { line, column }
    }

    /// Full source text without the sentinel.
    pub fn as_string(&self) -> String {
        self.text(0, self.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_is_appended_once() {
        let source = Source::new("ab");
        assert_eq!(source.len(), 2);
        assert_eq!(source.at(2), END_OF_BUFFER);
        assert_eq!(source.at(10), END_OF_BUFFER);
    }

    #[test]
    fn test_text_counts_code_points() {
        let source = Source::new("会員/users");
        assert_eq!(source.text(0, 2), "会員");
        assert_eq!(source.text(3, 8), "users");
    }

    #[test]
    fn test_position_translation() {
        let source = Source::new("ab\ncd\n");
        assert_eq!(source.position(0), TextPosition { line: 1, column: 0 });
        assert_eq!(source.position(2), TextPosition { line: 1, column: 2 });
        assert_eq!(source.position(3), TextPosition { line: 2, column: 0 });
        assert_eq!(source.position(5), TextPosition { line: 2, column: 2 });
    }

    #[test]
    fn test_empty_source() {
        let source = Source::new("");
        assert!(source.is_empty());
        assert_eq!(source.at(0), END_OF_BUFFER);
        assert_eq!(source.position(0), TextPosition { line: 1, column: 0 });
    }
}
