//! Message thread widget.
//!
//! Renders only the messages the viewport reports as visible, skipping the
//! rows of the first one that are scrolled off the top. Each message is a
//! header (`HH:MM you` or `HH:MM contact`, plus a delivery suffix while
//! unconfirmed) followed by its wrapped body indented under it.

use crate::model::{Delivery, Message, Sender};
use crate::state::MessageBuffer;
use crate::view::styles::ThreadStyles;
use crate::view_state::layout::{body_width, wrap_text, BODY_INDENT};
use crate::view_state::ThreadViewport;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Widget};

pub struct ThreadView<'a> {
    messages: &'a MessageBuffer,
    viewport: &'a ThreadViewport,
    styles: ThreadStyles,
}

impl<'a> ThreadView<'a> {
    pub fn new(messages: &'a MessageBuffer, viewport: &'a ThreadViewport, styles: ThreadStyles) -> Self {
        Self {
            messages,
            viewport,
            styles,
        }
    }
}

impl Widget for ThreadView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let range = self.viewport.visible_range();
        let lines: Vec<Line<'static>> = range
            .indices()
            .filter_map(|index| self.messages.get(index))
            .flat_map(|message| message_lines(message, area.width, &self.styles))
            .collect();

        let skip = u16::try_from(range.clipped_rows()).unwrap_or(u16::MAX);
        Paragraph::new(lines).scroll((skip, 0)).render(area, buf);
    }
}

fn sender_label(sender: Sender) -> &'static str {
    match sender {
        Sender::Page => "you",
        Sender::Contact => "contact",
    }
}

/// Lines for one message. Always `message_height(message, width)` long.
pub fn message_lines(message: &Message, width: u16, styles: &ThreadStyles) -> Vec<Line<'static>> {
    let mut header = vec![Span::styled(
        format!(
            "{} {}",
            message.created_at().format("%H:%M"),
            sender_label(message.sender())
        ),
        styles.sender(message.sender()),
    )];
    let suffix = match message.delivery() {
        Delivery::Confirmed { .. } => None,
        Delivery::Pending { .. } => Some(" (sending…)".to_string()),
        Delivery::Failed { reason, .. } => Some(format!(" (failed: {reason})")),
    };
    if let (Some(suffix), Some(style)) = (suffix, styles.delivery(message)) {
        header.push(Span::styled(suffix, style));
    }

    let indent = " ".repeat(usize::from(BODY_INDENT));
    let body_style = styles.body(message);
    let mut lines = vec![Line::from(header)];
    lines.extend(
        wrap_text(message.text(), body_width(width))
            .into_iter()
            .map(|text| Line::from(Span::styled(format!("{indent}{text}"), body_style))),
    );
    lines
}
