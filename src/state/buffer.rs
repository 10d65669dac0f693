//! Ordered message buffer shared by the history loader, the outbox and the
//! live merger.
//!
//! # Invariants
//! - Messages are held oldest first.
//! - Positions never change once a message is placed, except that a prepend
//!   shifts every index by the page length.
//! - A server id appears at most once.

use crate::model::{LocalId, Message, MessageId};
use chrono::{DateTime, Utc};
use std::collections::{HashSet, VecDeque};

#[derive(Debug, Clone, Default)]
pub struct MessageBuffer {
    messages: VecDeque<Message>,
    /// Server ids of every confirmed message in `messages`.
    known: HashSet<MessageId>,
}

impl MessageBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Message> {
        self.messages.get(index)
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.back()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Message> + ExactSizeIterator {
        self.messages.iter()
    }

    pub fn contains_server_id(&self, id: &MessageId) -> bool {
        self.known.contains(id)
    }

    pub fn position_of_local(&self, local: LocalId) -> Option<usize> {
        self.messages.iter().position(|m| m.local_id() == Some(local))
    }

    /// Prepend an oldest-first page in front of everything held.
    ///
    /// Messages whose server id is already present are skipped. Returns the
    /// number of messages actually inserted.
    pub(crate) fn prepend(&mut self, page: Vec<Message>) -> usize {
        let mut fresh = Vec::with_capacity(page.len());
        for message in page {
            if let Some(id) = message.server_id() {
                if !self.known.insert(id.clone()) {
                    continue;
                }
            }
            fresh.push(message);
        }

        let inserted = fresh.len();
        for message in fresh.into_iter().rev() {
            self.messages.push_front(message);
        }
        inserted
    }

    /// Append at the tail. Returns false if the server id is already present.
    pub(crate) fn push(&mut self, message: Message) -> bool {
        if let Some(id) = message.server_id() {
            if !self.known.insert(id.clone()) {
                return false;
            }
        }
        self.messages.push_back(message);
        true
    }

    /// Confirm the placeholder at `index` in place.
    pub(crate) fn confirm_at(&mut self, index: usize, id: MessageId, created_at: DateTime<Utc>) {
        if let Some(message) = self.messages.get_mut(index) {
            self.known.insert(id.clone());
            message.confirm(id, created_at);
        }
    }

    pub(crate) fn fail_at(&mut self, index: usize, reason: &str) {
        if let Some(message) = self.messages.get_mut(index) {
            message.fail(reason);
        }
    }

    pub(crate) fn remove_at(&mut self, index: usize) -> Option<Message> {
        let removed = self.messages.remove(index)?;
        if let Some(id) = removed.server_id() {
            self.known.remove(id);
        }
        Some(removed)
    }
}
