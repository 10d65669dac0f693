//! History loader bookkeeping: cursor frontier, in-flight request and the
//! cursor-used set that makes page merges idempotent.
//!
//! The loader never touches the buffer itself. It decides whether a request may
//! be issued and whether a resolved page may be merged; the merge is performed by
//! [`ConversationState`](crate::state::ConversationState).

use crate::model::Cursor;
use std::collections::HashSet;
use tracing::debug;

/// Key identifying one history page.
///
/// `Initial` is a dedicated variant rather than a string sentinel, so a server
/// cursor spelled `"initial"` can never be mistaken for the first page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CursorKey {
    /// The most recent page (no cursor).
    Initial,
    /// An older page reached through a server cursor.
    Token(Cursor),
}

impl CursorKey {
    pub fn from_cursor(cursor: Option<Cursor>) -> Self {
        match cursor {
            Some(cursor) => Self::Token(cursor),
            None => Self::Initial,
        }
    }

    /// Cursor to send to the History API (`None` for the initial page).
    pub fn cursor(&self) -> Option<&Cursor> {
        match self {
            Self::Initial => None,
            Self::Token(cursor) => Some(cursor),
        }
    }
}

/// Where the next older page starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frontier {
    /// No page merged yet.
    Unfetched,
    /// More history exists behind this cursor.
    More(Cursor),
    /// The server reported no older page.
    Exhausted,
}

#[derive(Debug, Clone)]
pub struct HistoryLoader {
    used: HashSet<CursorKey>,
    frontier: Frontier,
    in_flight: Option<CursorKey>,
    has_fetched: bool,
}

impl Default for HistoryLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryLoader {
    pub fn new() -> Self {
        Self {
            used: HashSet::new(),
            frontier: Frontier::Unfetched,
            in_flight: None,
            has_fetched: false,
        }
    }

    /// True once the first page has been merged.
    pub fn has_fetched(&self) -> bool {
        self.has_fetched
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn is_exhausted(&self) -> bool {
        self.frontier == Frontier::Exhausted
    }

    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    pub fn is_used(&self, key: &CursorKey) -> bool {
        self.used.contains(key)
    }

    /// Request the most recent page.
    ///
    /// Refused once a page has been merged or while a request is in flight.
    /// A failed initial load can be requested again.
    pub fn begin_initial(&mut self) -> Option<CursorKey> {
        if self.has_fetched || self.in_flight.is_some() {
            return None;
        }
        self.in_flight = Some(CursorKey::Initial);
        Some(CursorKey::Initial)
    }

    /// Request the next older page behind the stored frontier.
    ///
    /// Refused before the first merge, while a request is in flight, and once
    /// history is exhausted.
    pub fn begin_older(&mut self) -> Option<CursorKey> {
        if !self.has_fetched || self.in_flight.is_some() {
            return None;
        }
        let Frontier::More(cursor) = &self.frontier else {
            return None;
        };
        let key = CursorKey::Token(cursor.clone());
        if self.is_used(&key) {
            return None;
        }
        self.in_flight = Some(key.clone());
        Some(key)
    }

    /// Record a successful resolution of `key`.
    ///
    /// Returns false (and changes nothing but the in-flight marker) when the
    /// page was already merged.
    pub fn accept(&mut self, key: &CursorKey, next_cursor: Option<Cursor>) -> bool {
        self.settle(key);

        if !self.used.insert(key.clone()) {
            debug!(?key, "Discarding duplicate history page");
            return false;
        }

        self.frontier = match next_cursor {
            Some(cursor) => Frontier::More(cursor),
            None => Frontier::Exhausted,
        };
        self.has_fetched = true;
        true
    }

    /// Record a failed resolution of `key`. Nothing is merged.
    pub fn reject(&mut self, key: &CursorKey) {
        self.settle(key);
    }

    fn settle(&mut self, key: &CursorKey) {
        if self.in_flight.as_ref() == Some(key) {
            self.in_flight = None;
        }
    }
}

#[cfg(test)]
#[path = "history_tests.rs"]
mod tests;
