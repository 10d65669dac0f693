//! Layout and timing constants for the chat panel.

use std::time::Duration;

/// Height of the status line in rows.
pub const STATUS_BAR_HEIGHT: u16 = 1;

/// Height of the composer in rows.
pub const COMPOSER_HEIGHT: u16 = 1;

/// How long the event loop waits for terminal input before draining
/// collaborator results.
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Upper bound on session updates applied per loop iteration, so a burst of
/// push events cannot starve keyboard input.
pub const MAX_UPDATES_PER_TICK: usize = 64;

/// Rows from the top of the thread at which the next older page is requested.
pub const DEFAULT_TOP_THRESHOLD: usize = 2;

/// Width used when the terminal reports zero columns.
pub const FALLBACK_WIDTH: u16 = 80;
