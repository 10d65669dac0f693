//! LIVE indicator for the status line.
//!
//! Green `[LIVE]` while the push subscription is connected, gray `[OFFLINE]`
//! once it is lost or could not be established.

use ratatui::{
    style::{Color, Style},
    text::Span,
};

const LIVE_TEXT: &str = "[LIVE] ";
const OFFLINE_TEXT: &str = "[OFFLINE] ";

/// Stateless indicator built from the session's connection state.
///
/// ```rust
/// use convsync::view::live_indicator::LiveIndicator;
///
/// assert_eq!(LiveIndicator::new(true, true).render().content, "[LIVE] ");
/// assert_eq!(LiveIndicator::new(false, true).render().content, "[OFFLINE] ");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct LiveIndicator {
    connected: bool,
    colors: bool,
}

impl LiveIndicator {
    pub fn new(connected: bool, colors: bool) -> Self {
        Self { connected, colors }
    }

    pub fn render(&self) -> Span<'static> {
        let (text, color) = if self.connected {
            (LIVE_TEXT, Color::Green)
        } else {
            (OFFLINE_TEXT, Color::Gray)
        };
        if self.colors {
            Span::styled(text, Style::default().fg(color))
        } else {
            Span::raw(text)
        }
    }
}

// ===== Tests =====

#[cfg(test)]
#[path = "live_indicator_tests.rs"]
mod tests;
