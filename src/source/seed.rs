//! JSONL seed history for the simulated backend.
//!
//! One [`WireMessage`] object per line, oldest first. Blank lines are skipped.
//! A malformed line is reported with its 1-based line number and skipped; only
//! an I/O failure aborts loading.

use crate::model::error::SeedError;
use crate::model::{MessageId, Sender, WireMessage};
use chrono::{DateTime, Duration, Utc};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::warn;

/// Result of reading a seed file.
#[derive(Debug, Default)]
pub struct SeedHistory {
    /// Parsed messages, oldest first.
    pub messages: Vec<WireMessage>,
    /// Lines that were skipped.
    pub errors: Vec<SeedError>,
}

/// Read seed history from `path`.
///
/// # Errors
///
/// Returns `SeedError::Io` if the file cannot be opened or read.
pub fn load_seed(path: &Path) -> Result<SeedHistory, SeedError> {
    let file = File::open(path)?;
    read_seed(BufReader::new(file))
}

/// Read seed history from any buffered reader.
pub fn read_seed<R: BufRead>(reader: R) -> Result<SeedHistory, SeedError> {
    let mut history = SeedHistory::default();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match parse_line(&line, index + 1) {
            Ok(message) => history.messages.push(message),
            Err(error) => {
                warn!(%error, "Skipping malformed seed line");
                history.errors.push(error);
            }
        }
    }

    Ok(history)
}

/// Parse one seed line.
///
/// # Errors
///
/// Returns `SeedError::InvalidJson` carrying `line_number` (1-indexed).
pub fn parse_line(raw: &str, line_number: usize) -> Result<WireMessage, SeedError> {
    serde_json::from_str(raw).map_err(|e| SeedError::InvalidJson {
        line: line_number,
        message: e.to_string(),
    })
}

/// Synthetic back-and-forth used when no seed file is given.
///
/// `count` messages one minute apart, the newest one minute before `now`.
pub fn demo_history(count: usize, now: DateTime<Utc>) -> Vec<WireMessage> {
    (0..count)
        .filter_map(|i| {
            let id = MessageId::new(format!("seed-{i}")).ok()?;
            let minutes_ago = i64::try_from(count - i).ok()?;
            let (sender, text) = if i % 2 == 0 {
                (Sender::Contact, format!("Question {i} about the listing?"))
            } else {
                (Sender::Page, format!("Answer {i}: happy to help with that."))
            };
            Some(WireMessage::new(
                id,
                text,
                now - Duration::minutes(minutes_ago),
                sender,
            ))
        })
        .collect()
}
