//! Byte spans into stylesheet and template sources.

use text_size::{TextRange, TextSize};

/// A byte offset into a source string.
pub type ByteOffset = TextSize;

/// A half-open byte range `[start, end)` in a source file.
///
/// Nodes synthesized by a pass (rather than parsed) use [`Span::detached`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    /// The start byte offset (inclusive).
    pub start: ByteOffset,
    /// The end byte offset (exclusive).
    pub end: ByteOffset,
}

impl Span {
    /// The span given to nodes that do not come from source text.
    #[inline]
    pub fn detached() -> Self {
        Self::default()
    }

    /// Creates a new span from start and end byte offsets.
    #[inline]
    pub fn new(start: impl Into<ByteOffset>, end: impl Into<ByteOffset>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Creates a span from `usize` offsets, as produced by lexers.
    #[inline]
    pub fn from_range(range: std::ops::Range<usize>) -> Self {
        Self::new(range.start as u32, range.end as u32)
    }

    /// Creates an empty span at the given offset.
    #[inline]
    pub fn empty(offset: impl Into<ByteOffset>) -> Self {
        let offset = offset.into();
        Self {
            start: offset,
            end: offset,
        }
    }

    /// Returns the length of this span in bytes.
    #[inline]
    pub fn len(&self) -> TextSize {
        self.end - self.start
    }

    /// Returns true if this span is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns a span covering both this span and another.
    #[inline]
    pub fn cover(self, other: Span) -> Span {
        Span {
            start: std::cmp::min(self.start, other.start),
            end: std::cmp::max(self.end, other.end),
        }
    }

    /// Returns the text this span covers, or `""` when it falls outside `source`.
    pub fn slice(self, source: &str) -> &str {
        source
            .get(u32::from(self.start) as usize..u32::from(self.end) as usize)
            .unwrap_or("")
    }
}

impl From<TextRange> for Span {
    fn from(range: TextRange) -> Self {
        Self {
            start: range.start(),
            end: range.end(),
        }
    }
}

impl From<Span> for TextRange {
    fn from(span: Span) -> Self {
        TextRange::new(span.start, span.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_range() {
        let span = Span::from_range(3..9);
        assert_eq!(span.start, TextSize::from(3));
        assert_eq!(span.len(), TextSize::from(6));
    }

    #[test]
    fn test_detached_is_empty() {
        assert!(Span::detached().is_empty());
        assert_eq!(Span::detached(), Span::empty(0u32));
    }

    #[test]
    fn test_cover() {
        let covered = Span::new(5u32, 10u32).cover(Span::new(8u32, 20u32));
        assert_eq!(covered, Span::new(5u32, 20u32));
    }

    #[test]
    fn test_slice() {
        let source = ".main { color: red; }";
        assert_eq!(Span::new(1u32, 5u32).slice(source), "main");
        assert_eq!(Span::new(40u32, 50u32).slice(source), "");
    }
}
