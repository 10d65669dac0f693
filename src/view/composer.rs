//! Single-line message composer.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use unicode_width::UnicodeWidthChar;

const PROMPT: &str = "> ";

/// Text being composed. Editing happens at the end only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Composer {
    text: String,
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn insert(&mut self, ch: char) {
        if !ch.is_control() {
            self.text.push(ch);
        }
    }

    pub fn backspace(&mut self) {
        self.text.pop();
    }

    /// Take the composed text, leaving the composer empty.
    pub fn take(&mut self) -> String {
        std::mem::take(&mut self.text)
    }
}

/// Composer widget. Shows the tail of the text when it is wider than the area.
pub struct ComposerView<'a> {
    composer: &'a Composer,
}

impl<'a> ComposerView<'a> {
    pub fn new(composer: &'a Composer) -> Self {
        Self { composer }
    }
}

impl Widget for ComposerView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Prompt and cursor cell.
        let reserved = PROMPT.len() + 1;
        let available = usize::from(area.width).saturating_sub(reserved);
        let shown = visible_tail(self.composer.text(), available);

        let line = Line::from(vec![
            Span::styled(PROMPT, Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(shown.to_string()),
            Span::styled(" ", Style::default().add_modifier(Modifier::REVERSED)),
        ]);
        Paragraph::new(line).render(area, buf);
    }
}

/// Longest suffix of `text` that fits in `columns` display columns.
fn visible_tail(text: &str, columns: usize) -> &str {
    let mut used = 0;
    let mut start = text.len();
    for (index, ch) in text.char_indices().rev() {
        used += ch.width().unwrap_or(0);
        if used > columns {
            break;
        }
        start = index;
    }
    &text[start..]
}
