//! Pending queue for optimistic sends.
//!
//! Confirmations carry no correlation id, so the queue is strictly FIFO: the
//! oldest pending placeholder is resolved by the next echo of an own send.
//! Concurrent sends that the server confirms out of order are mis-attributed;
//! this is a known limitation of the wire protocol.

use crate::model::LocalId;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::VecDeque;

/// What happens to a placeholder whose send request was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailedSendPolicy {
    /// Remove the placeholder from the thread.
    #[default]
    Discard,
    /// Keep it visible as failed so it can be retried.
    Retain,
}

impl FailedSendPolicy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "discard" => Some(Self::Discard),
            "retain" => Some(Self::Retain),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Outbox {
    queue: VecDeque<LocalId>,
    last_local: u64,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a local id derived from `now`, strictly greater than any
    /// previously allocated one.
    pub fn next_local_id(&mut self, now: DateTime<Utc>) -> LocalId {
        let millis = u64::try_from(now.timestamp_millis()).unwrap_or(0);
        let id = millis.max(self.last_local + 1);
        self.last_local = id;
        LocalId::new(id)
    }

    pub fn enqueue(&mut self, local: LocalId) {
        self.queue.push_back(local);
    }

    /// Pop the oldest pending placeholder.
    pub fn pop_oldest(&mut self) -> Option<LocalId> {
        self.queue.pop_front()
    }

    pub fn peek_oldest(&self) -> Option<LocalId> {
        self.queue.front().copied()
    }

    /// Remove a specific entry (send failure). Returns false if absent.
    pub fn remove(&mut self, local: LocalId) -> bool {
        match self.queue.iter().position(|l| *l == local) {
            Some(index) => {
                self.queue.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = LocalId> + '_ {
        self.queue.iter().copied()
    }
}

/// Whether `text` may be sent. Empty and whitespace-only input is refused.
pub fn is_sendable(text: &str) -> bool {
    !text.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap()
    }

    #[test]
    fn local_ids_derive_from_timestamp() {
        let mut outbox = Outbox::new();
        let id = outbox.next_local_id(now());
        assert_eq!(id.get(), now().timestamp_millis() as u64);
    }

    #[test]
    fn local_ids_strictly_increase_within_same_millisecond() {
        let mut outbox = Outbox::new();
        let a = outbox.next_local_id(now());
        let b = outbox.next_local_id(now());
        let c = outbox.next_local_id(now());
        assert!(a < b && b < c);
    }

    #[test]
    fn queue_is_fifo() {
        let mut outbox = Outbox::new();
        outbox.enqueue(LocalId::new(1));
        outbox.enqueue(LocalId::new(2));
        outbox.enqueue(LocalId::new(3));

        assert_eq!(outbox.pop_oldest(), Some(LocalId::new(1)));
        assert_eq!(outbox.pop_oldest(), Some(LocalId::new(2)));
        assert_eq!(outbox.pop_oldest(), Some(LocalId::new(3)));
        assert_eq!(outbox.pop_oldest(), None);
    }

    #[test]
    fn remove_takes_entry_out_of_the_middle() {
        let mut outbox = Outbox::new();
        outbox.enqueue(LocalId::new(1));
        outbox.enqueue(LocalId::new(2));
        outbox.enqueue(LocalId::new(3));

        assert!(outbox.remove(LocalId::new(2)));
        assert!(!outbox.remove(LocalId::new(2)));
        assert_eq!(outbox.iter().collect::<Vec<_>>(), vec![LocalId::new(1), LocalId::new(3)]);
    }

    #[test]
    fn whitespace_only_text_is_not_sendable() {
        assert!(!is_sendable(""));
        assert!(!is_sendable("   \n\t"));
        assert!(is_sendable(" hi "));
    }

    #[test]
    fn failed_send_policy_parses_config_values() {
        assert_eq!(FailedSendPolicy::parse("discard"), Some(FailedSendPolicy::Discard));
        assert_eq!(FailedSendPolicy::parse("retain"), Some(FailedSendPolicy::Retain));
        assert_eq!(FailedSendPolicy::parse("keep"), None);
        assert_eq!(FailedSendPolicy::default(), FailedSendPolicy::Discard);
    }
}
