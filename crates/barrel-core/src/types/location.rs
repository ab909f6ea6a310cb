//! Source span types for tracking statement positions in source files.

use std::ops::Range;

use serde::{Deserialize, Serialize};

/// A byte range within a source file together with its starting position.
///
/// Spans are recorded for statements the self-healing pass may rewrite
/// (default exports, consumer imports), so byte offsets are `usize` and can
/// slice the file text directly.
///
/// # Field Conventions
///
/// - `line` is 1-indexed (first line is line 1)
/// - `column` is 0-indexed (first character is column 0)
/// - `start`/`end` are absolute byte offsets, `end` exclusive
///
/// # Examples
///
/// ```
/// use barrel_core::SourceSpan;
///
/// let text = "export default Foo;\n";
/// let span = SourceSpan::new(1, 0, 0, 19);
/// assert_eq!(&text[span.range()], "export default Foo;");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SourceSpan {
    /// Line number (1-indexed).
    pub line: u32,

    /// Column number (0-indexed, UTF-8 byte offset within the line).
    pub column: u32,

    /// Absolute start byte offset.
    pub start: usize,

    /// Absolute end byte offset (exclusive).
    pub end: usize,
}

impl SourceSpan {
    /// Creates a new span.
    #[inline]
    #[must_use]
    pub const fn new(line: u32, column: u32, start: usize, end: usize) -> Self {
        Self {
            line,
            column,
            start,
            end,
        }
    }

    /// The span as a byte range.
    #[inline]
    #[must_use]
    pub const fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Returns `true` if `other` lies entirely inside this span.
    #[inline]
    #[must_use]
    pub const fn contains(&self, other: &Self) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_contains() {
        let outer = SourceSpan::new(1, 0, 0, 40);
        let inner = SourceSpan::new(1, 7, 7, 20);
        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
    }
}
