//! Auto-scroll policy: when a buffer change should pull the view to the newest
//! message.
//!
//! The flag starts set so the first history page lands at the bottom. After a
//! scroll that happens once history has been fetched, the flag clears, so
//! later older-page prepends keep the reader's position. Sends and applied push
//! events set it again.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoScrollPolicy {
    should_auto_scroll: bool,
}

impl Default for AutoScrollPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl AutoScrollPolicy {
    pub fn new() -> Self {
        Self {
            should_auto_scroll: true,
        }
    }

    pub fn should_auto_scroll(&self) -> bool {
        self.should_auto_scroll
    }

    /// New forward-looking activity (own send, live event).
    pub fn force(&mut self) {
        self.should_auto_scroll = true;
    }

    /// Called on every buffer change. Returns true if the view must scroll to
    /// the newest message.
    pub fn on_buffer_changed(&mut self, has_fetched: bool) -> bool {
        if !self.should_auto_scroll {
            return false;
        }
        if has_fetched {
            self.should_auto_scroll = false;
        }
        true
    }
}
