//! View-state layer - Layout and scrolling for the message thread
//!
//! # Module Structure
//!
//! - `types`: Core newtypes (LineOffset, ViewportDimensions)
//! - `layout`: Text wrapping and per-message heights
//! - `height_index`: HeightIndex - O(log n) prefix sums via Fenwick tree
//! - `visible_range`: VisibleRange - result of visible range calculation
//! - `viewport`: ThreadViewport - scroll offset, anchors and bottom pinning

pub mod height_index;
pub mod layout;
pub mod types;
pub mod viewport;
pub mod visible_range;

pub use types::{LineOffset, ViewportDimensions};
pub use viewport::{ScrollAnchor, ThreadViewport};
pub use visible_range::VisibleRange;
