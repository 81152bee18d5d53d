//! Source positions.

use std::fmt;

/// A position in the decoded source text.
///
/// `line` and `column` are 1-based and count characters, so they match what
/// an editor shows for both ASCII and multi-byte input. `index` is the byte
/// offset into the decoded UTF-8 buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "facet", derive(facet::Facet))]
pub struct Mark {
    /// Byte offset into the decoded buffer.
    pub index: u32,
    /// Line number, starting at 1.
    pub line: u32,
    /// Column number (in characters), starting at 1.
    pub column: u32,
}

impl Mark {
    /// The position of the first character of a stream.
    pub const START: Mark = Mark {
        index: 0,
        line: 1,
        column: 1,
    };

    /// Create a mark from its parts.
    #[inline]
    pub fn new(index: u32, line: u32, column: u32) -> Self {
        Self {
            index,
            line,
            column,
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// A range in the source text between two marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "facet", derive(facet::Facet))]
pub struct Span {
    /// Start (inclusive).
    pub start: Mark,
    /// End (exclusive).
    pub end: Mark,
}

impl Span {
    /// Create a new span from two marks.
    #[inline]
    pub fn new(start: Mark, end: Mark) -> Self {
        debug_assert!(start.index <= end.index);
        Self { start, end }
    }

    /// Create an empty span at a position.
    #[inline]
    pub fn empty(at: Mark) -> Self {
        Self { start: at, end: at }
    }

    /// Length of this span in bytes.
    #[inline]
    pub fn len(&self) -> u32 {
        self.end.index - self.start.index
    }

    /// Whether this span is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start.index == self.end.index
    }

    /// Extend this span to include another span.
    #[inline]
    pub fn extend(&self, other: Span) -> Span {
        let start = if other.start.index < self.start.index {
            other.start
        } else {
            self.start
        };
        let end = if other.end.index > self.end.index {
            other.end
        } else {
            self.end
        };
        Span { start, end }
    }

    /// Get the source text for this span.
    #[inline]
    pub fn slice<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start.index as usize..self.end.index as usize]
    }
}

impl From<Span> for std::ops::Range<usize> {
    fn from(span: Span) -> Self {
        span.start.index as usize..span.end.index as usize
    }
}
