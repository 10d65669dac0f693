//! Status line: connection, conversation summary and the latest notice.

use crate::model::Notice;
use crate::state::ConversationState;
use crate::view::live_indicator::LiveIndicator;
use crate::view::styles::ThreadStyles;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

pub struct StatusLine<'a> {
    state: &'a ConversationState,
    live: bool,
    notice: Option<&'a Notice>,
    styles: ThreadStyles,
    colors: bool,
}

impl<'a> StatusLine<'a> {
    pub fn new(
        state: &'a ConversationState,
        live: bool,
        notice: Option<&'a Notice>,
        styles: ThreadStyles,
        colors: bool,
    ) -> Self {
        Self {
            state,
            live,
            notice,
            styles,
            colors,
        }
    }
}

/// Where the loader stands, if worth showing.
fn history_marker(state: &ConversationState) -> Option<&'static str> {
    let history = state.history();
    if history.is_loading() {
        Some(if history.has_fetched() {
            "loading older…"
        } else {
            "loading…"
        })
    } else if history.is_exhausted() {
        Some("start of conversation")
    } else {
        None
    }
}

impl Widget for StatusLine<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut summary = format!(
            "{} | {} messages",
            self.state.conversation(),
            self.state.messages().len()
        );
        let pending = self.state.outbox().len();
        if pending > 0 {
            summary.push_str(&format!(" | {pending} sending"));
        }
        if let Some(marker) = history_marker(self.state) {
            summary.push_str(" | ");
            summary.push_str(marker);
        }

        let mut spans = vec![
            LiveIndicator::new(self.live, self.colors).render(),
            Span::styled(summary, self.styles.muted()),
        ];
        if let Some(notice) = self.notice {
            spans.push(Span::raw(" | "));
            spans.push(Span::styled(
                notice.text().to_string(),
                self.styles.notice(notice.level()),
            ));
        }

        Paragraph::new(Line::from(spans)).render(area, buf);
    }
}
