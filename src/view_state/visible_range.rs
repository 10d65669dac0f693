//! Visible range calculation result

use super::types::LineOffset;

/// Range of messages visible in the current viewport.
///
/// # Invariants
/// - `start_index <= end_index`
/// - Every message in range has some portion inside the viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VisibleRange {
    /// Index of first visible message (inclusive).
    pub start_index: usize,
    /// Index past the last visible message (exclusive).
    pub end_index: usize,
    /// Scroll offset the range was computed for.
    pub scroll_offset: LineOffset,
    /// Line offset at which `start_index` begins. May be above the viewport.
    pub start_y: usize,
}

impl VisibleRange {
    pub fn new(start_index: usize, end_index: usize, scroll_offset: LineOffset, start_y: usize) -> Self {
        debug_assert!(start_index <= end_index, "start_index must not exceed end_index");
        Self {
            start_index,
            end_index,
            scroll_offset,
            start_y,
        }
    }

    pub fn len(&self) -> usize {
        self.end_index - self.start_index
    }

    pub fn is_empty(&self) -> bool {
        self.start_index == self.end_index
    }

    pub fn indices(&self) -> std::ops::Range<usize> {
        self.start_index..self.end_index
    }

    /// Rows of the first visible message hidden above the viewport.
    pub fn clipped_rows(&self) -> usize {
        self.scroll_offset.get().saturating_sub(self.start_y)
    }
}
