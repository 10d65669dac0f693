//! Thread styling configuration.
//!
//! Distinct colors for the two senders and for messages that are still
//! sending or failed to send.

use crate::model::{Delivery, Message, NoticeLevel, Sender};
use ratatui::style::{Color, Modifier, Style};

// ===== ColorConfig =====

/// Configuration for color output.
///
/// Determines whether colors should be enabled or disabled based on:
/// - `--no-color` CLI flag
/// - `NO_COLOR` environment variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorConfig {
    enabled: bool,
}

impl ColorConfig {
    /// Create a ColorConfig from CLI args and environment.
    ///
    /// Priority (first match wins):
    /// 1. `--no-color` flag (disables colors)
    /// 2. `NO_COLOR` env var (any value disables colors)
    /// 3. Default: colors enabled
    pub fn from_env_and_args(no_color_flag: bool) -> Self {
        let enabled = !no_color_flag && std::env::var("NO_COLOR").is_err();
        Self { enabled }
    }

    pub fn colors_enabled(self) -> bool {
        self.enabled
    }
}

// ===== ThreadStyles =====

/// Styles for the thread, status line and composer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadStyles {
    page_style: Style,
    contact_style: Style,
    pending_style: Style,
    failed_style: Style,
    info_style: Style,
}

impl ThreadStyles {
    /// If colors are disabled, only text modifiers are used.
    pub fn with_color_config(config: ColorConfig) -> Self {
        let dim = Style::default().add_modifier(Modifier::DIM);
        if config.colors_enabled() {
            Self {
                page_style: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                contact_style: Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                pending_style: dim.fg(Color::Gray),
                failed_style: Style::default().fg(Color::Red),
                info_style: Style::default().fg(Color::Yellow),
            }
        } else {
            Self {
                page_style: Style::default().add_modifier(Modifier::BOLD),
                contact_style: Style::default().add_modifier(Modifier::BOLD),
                pending_style: dim,
                failed_style: Style::default().add_modifier(Modifier::REVERSED),
                info_style: Style::default(),
            }
        }
    }

    /// Header style for a message's sender.
    pub fn sender(&self, sender: Sender) -> Style {
        match sender {
            Sender::Page => self.page_style,
            Sender::Contact => self.contact_style,
        }
    }

    /// Style for the delivery suffix of a header, if it has one.
    pub fn delivery(&self, message: &Message) -> Option<Style> {
        match message.delivery() {
            Delivery::Confirmed { .. } => None,
            Delivery::Pending { .. } => Some(self.pending_style),
            Delivery::Failed { .. } => Some(self.failed_style),
        }
    }

    /// Body style: pending messages are dimmed until confirmed.
    pub fn body(&self, message: &Message) -> Style {
        if message.is_pending() {
            self.pending_style
        } else {
            Style::default()
        }
    }

    pub fn notice(&self, level: NoticeLevel) -> Style {
        match level {
            NoticeLevel::Info => self.info_style,
            NoticeLevel::Error => self.failed_style,
        }
    }

    pub fn muted(&self) -> Style {
        self.pending_style
    }
}

impl Default for ThreadStyles {
    fn default() -> Self {
        Self::with_color_config(ColorConfig::from_env_and_args(false))
    }
}

// ===== Tests =====

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LocalId, MessageId};
    use chrono::{TimeZone, Utc};
    use serial_test::serial;

    #[test]
    #[serial(no_color)]
    fn color_config_respects_no_color_env_var() {
        std::env::set_var("NO_COLOR", "1");
        let config = ColorConfig::from_env_and_args(false);
        std::env::remove_var("NO_COLOR");

        assert!(!config.colors_enabled(), "NO_COLOR env var should disable colors");
    }

    #[test]
    #[serial(no_color)]
    fn color_config_enables_colors_by_default() {
        std::env::remove_var("NO_COLOR");
        assert!(ColorConfig::from_env_and_args(false).colors_enabled());
    }

    #[test]
    #[serial(no_color)]
    fn color_config_flag_disables_colors() {
        std::env::remove_var("NO_COLOR");
        assert!(!ColorConfig::from_env_and_args(true).colors_enabled());
    }

    #[test]
    fn no_color_styles_have_no_foreground() {
        let styles = ThreadStyles::with_color_config(ColorConfig::from_env_and_args(true));
        assert!(styles.sender(Sender::Page).fg.is_none());
        assert!(styles.sender(Sender::Contact).fg.is_none());
        assert!(styles.notice(NoticeLevel::Error).fg.is_none());
    }

    #[test]
    fn delivery_suffix_style_only_for_unconfirmed() {
        let styles = ThreadStyles::with_color_config(ColorConfig::from_env_and_args(true));
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap();
        let pending = Message::placeholder(LocalId::new(1), "hi", at);
        let confirmed = Message::confirmed(MessageId::new("srv-1").unwrap(), "hi", at, Sender::Page);

        assert!(styles.delivery(&pending).is_some());
        assert!(styles.delivery(&confirmed).is_none());
    }
}
