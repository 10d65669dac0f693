//! Text layout for thread messages.
//!
//! A message renders as one header row followed by its body, word-wrapped to
//! the thread width minus [`BODY_INDENT`]. The viewport and the thread widget
//! both go through [`wrap_text`], so measured heights always match what is
//! drawn.

use crate::model::Message;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Columns the body is indented under its header.
pub const BODY_INDENT: u16 = 2;

/// Header rows per message.
pub const HEADER_ROWS: usize = 1;

/// Word-wrap `text` to `width` display columns.
///
/// Explicit newlines are kept; runs of whitespace inside a line collapse to a
/// single space. Words wider than `width` are broken at character
/// boundaries. Always yields at least one line.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    for line in text.split('\n') {
        wrap_line(line.trim_end_matches('\r'), width, &mut lines);
    }
    lines
}

fn wrap_line(line: &str, width: usize, out: &mut Vec<String>) {
    let mut current = String::new();
    let mut current_width = 0;

    for word in line.split_whitespace() {
        let word_width = word.width();
        let separator = usize::from(!current.is_empty());

        if current_width + separator + word_width <= width {
            if separator == 1 {
                current.push(' ');
            }
            current.push_str(word);
            current_width += separator + word_width;
            continue;
        }

        if !current.is_empty() {
            out.push(std::mem::take(&mut current));
            current_width = 0;
        }

        if word_width <= width {
            current.push_str(word);
            current_width = word_width;
            continue;
        }

        for ch in word.chars() {
            let ch_width = ch.width().unwrap_or(0);
            if current_width + ch_width > width && !current.is_empty() {
                out.push(std::mem::take(&mut current));
                current_width = 0;
            }
            current.push(ch);
            current_width += ch_width;
        }
    }

    out.push(current);
}

/// Body width available inside a thread of `width` columns.
pub fn body_width(width: u16) -> usize {
    usize::from(width.saturating_sub(BODY_INDENT).max(1))
}

/// Rendered height of `message` in a thread `width` columns wide.
///
/// Deterministic and always >= 2 (header plus at least one body line).
pub fn message_height(message: &Message, width: u16) -> usize {
    HEADER_ROWS + wrap_text(message.text(), body_width(width)).len()
}
