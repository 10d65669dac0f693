//! Thread viewport: scroll offset over the laid-out message buffer.
//!
//! Offsets are measured in rows from the top of the thread. The viewport
//! knows nothing about why the buffer changed; callers capture a
//! [`ScrollAnchor`] before a history prepend and restore it afterwards so the
//! message under the reader's eye stays put.

use super::height_index::HeightIndex;
use super::layout::message_height;
use super::types::{LineOffset, ViewportDimensions};
use super::visible_range::VisibleRange;
use crate::state::MessageBuffer;

/// Scroll metrics recorded immediately before a prepend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollAnchor {
    pub offset: LineOffset,
    pub total_height: usize,
}

impl ScrollAnchor {
    /// Offset that keeps the same content in view once the thread has grown
    /// to `new_total` rows: `new_total - total_height + offset`.
    pub fn restored_offset(&self, new_total: usize) -> LineOffset {
        self.offset
            .saturating_add(new_total.saturating_sub(self.total_height))
    }
}

#[derive(Debug, Clone, Default)]
pub struct ThreadViewport {
    heights: HeightIndex,
    dimensions: ViewportDimensions,
    offset: LineOffset,
}

impl ThreadViewport {
    pub fn new(dimensions: ViewportDimensions) -> Self {
        Self {
            heights: HeightIndex::new(0),
            dimensions,
            offset: LineOffset::default(),
        }
    }

    pub fn dimensions(&self) -> ViewportDimensions {
        self.dimensions
    }

    /// Recompute every message height for the current width.
    ///
    /// The offset is clamped to the new content but otherwise left alone.
    pub fn relayout(&mut self, buffer: &MessageBuffer) {
        let width = self.dimensions.width;
        let mut heights = HeightIndex::new(buffer.len());
        for message in buffer.iter() {
            heights.push(message_height(message, width));
        }
        self.heights = heights;
        self.clamp();
    }

    /// Apply new terminal dimensions. A viewport pinned to the bottom stays
    /// pinned.
    pub fn resize(&mut self, dimensions: ViewportDimensions, buffer: &MessageBuffer) {
        if dimensions == self.dimensions {
            return;
        }
        let was_at_bottom = self.is_at_bottom();
        let width_changed = dimensions.width != self.dimensions.width;
        self.dimensions = dimensions;
        if width_changed {
            self.relayout(buffer);
        }
        if was_at_bottom {
            self.scroll_to_bottom();
        } else {
            self.clamp();
        }
    }

    pub fn total_height(&self) -> usize {
        self.heights.total()
    }

    pub fn max_offset(&self) -> LineOffset {
        LineOffset::new(
            self.total_height()
                .saturating_sub(usize::from(self.dimensions.height)),
        )
    }

    pub fn offset(&self) -> LineOffset {
        self.offset
    }

    /// Scroll by `delta` rows; negative scrolls towards older messages.
    pub fn scroll_by(&mut self, delta: isize) {
        self.offset = if delta < 0 {
            self.offset.saturating_sub(delta.unsigned_abs())
        } else {
            self.offset.saturating_add(delta.unsigned_abs())
        };
        self.clamp();
    }

    /// Rows moved by a page scroll: one less than the viewport, for context.
    pub fn page_rows(&self) -> isize {
        (usize::from(self.dimensions.height.max(2)) - 1) as isize
    }

    pub fn scroll_to_top(&mut self) {
        self.offset = LineOffset::default();
    }

    pub fn scroll_to_bottom(&mut self) {
        self.offset = self.max_offset();
    }

    pub fn is_at_bottom(&self) -> bool {
        self.offset >= self.max_offset()
    }

    /// Whether the viewport is within `threshold` rows of the oldest message.
    pub fn is_near_top(&self, threshold: usize) -> bool {
        self.offset.get() <= threshold
    }

    pub fn capture_anchor(&self) -> ScrollAnchor {
        ScrollAnchor {
            offset: self.offset,
            total_height: self.total_height(),
        }
    }

    /// Restore a position captured before a prepend. Call after
    /// [`relayout`](Self::relayout).
    pub fn restore(&mut self, anchor: ScrollAnchor) {
        self.offset = anchor.restored_offset(self.total_height());
        self.clamp();
    }

    /// Messages intersecting the viewport.
    pub fn visible_range(&self) -> VisibleRange {
        let Some(start) = self.heights.lower_bound(self.offset.get()) else {
            return VisibleRange::new(0, 0, self.offset, 0);
        };
        let bottom = self.offset.get() + usize::from(self.dimensions.height);
        let end = match self.heights.lower_bound(bottom.saturating_sub(1)) {
            Some(last) => last + 1,
            None => self.heights.len(),
        };
        VisibleRange::new(start, end.max(start), self.offset, self.heights.offset_of(start))
    }

    fn clamp(&mut self) {
        self.offset = self.offset.min(self.max_offset());
    }
}
