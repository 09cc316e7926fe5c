//! Byte spans into the document source.
//!
//! Every fragment of a [`Document`](crate::document::Document) remembers the
//! byte range it was read from so diagnostics can point back at the source.

use std::ops::Range;

/// A half-open byte range `start..end` into the document source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    start: usize,
    end: usize,
}

impl Span {
    /// Create a span from a byte range.
    ///
    /// Reversed ranges are normalized so that `start <= end`.
    pub fn new(range: Range<usize>) -> Self {
        let (start, end) = if range.start <= range.end {
            (range.start, range.end)
        } else {
            (range.end, range.start)
        };
        Self { start, end }
    }

    /// First byte covered by the span.
    pub fn start(&self) -> usize {
        self.start
    }

    /// One past the last byte covered by the span.
    pub fn end(&self) -> usize {
        self.end
    }

    /// Number of bytes covered.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Smallest span covering both `self` and `other`.
    pub fn union(&self, other: Span) -> Span {
        Span::new(self.start.min(other.start)..self.end.max(other.end))
    }

    /// The span as a `Range`, usable to slice the source text.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Span::new(range)
    }
}
