//! Byte-offset ranges and selections within a document's text.
//!
//! Offsets are UTF-8 byte positions into the full document text. Hosts that
//! address text by line/character convert at the boundary.

use serde::{Deserialize, Serialize};

/// A half-open byte range `[start, end)`.
///
/// Ranges order by start, then end, which is the in-document match order.
///
/// # Examples
///
/// ```
/// use hl_core::TextRange;
///
/// let range = TextRange::new(4, 7);
/// assert_eq!(range.len(), 3);
/// assert!(range.contains_offset(7));
/// assert!(!range.contains_offset(8));
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct TextRange {
    /// First byte of the range.
    pub start: usize,
    /// One past the last byte of the range.
    pub end: usize,
}

impl TextRange {
    /// Creates a range, swapping the bounds if they are reversed.
    #[inline]
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    /// Creates an empty range at `offset`.
    #[inline]
    #[must_use]
    pub const fn caret(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    /// Length in bytes.
    #[inline]
    #[must_use]
    pub const fn len(self) -> usize {
        self.end - self.start
    }

    /// Returns `true` for a zero-width range.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.start == self.end
    }

    /// Returns `true` if `offset` lies within the range, both ends inclusive.
    ///
    /// A caret placed directly after a match still counts as "on" it.
    #[inline]
    #[must_use]
    pub const fn contains_offset(self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end
    }

    /// Returns `true` if `other` lies entirely within `self`.
    #[inline]
    #[must_use]
    pub const fn contains_range(self, other: Self) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// A selection in an editor: an anchor and the active (caret) end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Selection {
    /// Where the selection started.
    pub anchor: usize,
    /// Where the caret is.
    pub active: usize,
}

impl Selection {
    /// Creates a selection.
    #[inline]
    #[must_use]
    pub const fn new(anchor: usize, active: usize) -> Self {
        Self { anchor, active }
    }

    /// Creates an empty selection (a caret) at `offset`.
    #[inline]
    #[must_use]
    pub const fn caret(offset: usize) -> Self {
        Self {
            anchor: offset,
            active: offset,
        }
    }

    /// Creates a selection covering `range`, caret at the end.
    #[inline]
    #[must_use]
    pub const fn from_range(range: TextRange) -> Self {
        Self {
            anchor: range.start,
            active: range.end,
        }
    }

    /// The selected range, normalized so `start <= end`.
    #[inline]
    #[must_use]
    pub const fn range(self) -> TextRange {
        TextRange::new(self.anchor, self.active)
    }

    /// Returns `true` when nothing is selected.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.anchor == self.active
    }
}
