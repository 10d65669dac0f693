//! In-process simulated backend.
//!
//! [`MemoryBackend`] implements all three collaborator contracts over shared
//! in-memory state so the TUI and the integration tests can run without a
//! server. It reproduces the behaviours the synchronizer has to cope with:
//!
//! - history served newest first in pages of `page_size`, with opaque
//!   `c<index>` cursors
//! - configurable latency on every request
//! - failure injection for the next N fetches or sends
//! - every accepted send echoed to the room as a `Page` push event carrying a
//!   server-assigned id, optionally followed by an auto-reply from the contact
//! - rooms that forget a subscriber as soon as its [`Subscription`] is dropped

use crate::model::error::{ChannelError, FetchError, SendError};
use crate::model::{
    ConversationId, Cursor, HistoryPage, MessageId, PushEvent, SendRequest, Sender, WireMessage,
};
use crate::source::{HistoryApi, PushChannel, SendApi, Subscription};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::mpsc;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

/// Default number of messages per history page.
pub const DEFAULT_PAGE_SIZE: usize = 20;

#[derive(Debug)]
struct Inner {
    /// Oldest first per conversation.
    histories: HashMap<ConversationId, Vec<WireMessage>>,
    rooms: HashMap<ConversationId, Vec<(u64, mpsc::Sender<PushEvent>)>>,
    next_subscriber: u64,
    next_server_id: u64,
    page_size: usize,
    latency: Duration,
    failing_fetches: usize,
    failing_sends: usize,
    auto_reply: bool,
}

impl Inner {
    fn append(&mut self, conversation: &ConversationId, message: WireMessage) {
        self.histories
            .entry(conversation.clone())
            .or_default()
            .push(message.clone());

        let event = PushEvent {
            conversation_id: conversation.clone(),
            message,
        };
        if let Some(subscribers) = self.rooms.get_mut(conversation) {
            subscribers.retain(|(_, tx)| tx.send(event.clone()).is_ok());
            if subscribers.is_empty() {
                self.rooms.remove(conversation);
            }
        }
    }

    fn mint_id(&mut self) -> Result<MessageId, SendError> {
        self.next_server_id += 1;
        MessageId::new(format!("srv-{}", self.next_server_id)).map_err(|e| SendError::Rejected {
            reason: e.to_string(),
        })
    }
}

/// Shared handle to the simulated backend. Clones see the same state.
#[derive(Debug, Clone)]
pub struct MemoryBackend {
    inner: Arc<Mutex<Inner>>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                histories: HashMap::new(),
                rooms: HashMap::new(),
                next_subscriber: 0,
                next_server_id: 0,
                page_size: DEFAULT_PAGE_SIZE,
                latency: Duration::ZERO,
                failing_fetches: 0,
                failing_sends: 0,
                auto_reply: false,
            })),
        }
    }

    pub fn with_page_size(self, page_size: usize) -> Self {
        self.lock().page_size = page_size.max(1);
        self
    }

    pub fn with_latency(self, latency: Duration) -> Self {
        self.lock().latency = latency;
        self
    }

    /// Answer every accepted send with `re: <text>` from the contact.
    pub fn with_auto_reply(self, auto_reply: bool) -> Self {
        self.lock().auto_reply = auto_reply;
        self
    }

    /// Append existing history (oldest first) without notifying subscribers.
    pub fn seed(&self, conversation: &ConversationId, messages: Vec<WireMessage>) {
        let mut inner = self.lock();
        debug!(%conversation, count = messages.len(), "Seeding history");
        inner
            .histories
            .entry(conversation.clone())
            .or_default()
            .extend(messages);
    }

    /// Deliver a message from the remote contact.
    pub fn contact_says(
        &self,
        conversation: &ConversationId,
        text: impl Into<String>,
    ) -> Result<WireMessage, SendError> {
        let mut inner = self.lock();
        let id = inner.mint_id()?;
        let message = WireMessage::new(id, text, Utc::now(), Sender::Contact);
        inner.append(conversation, message.clone());
        Ok(message)
    }

    /// Make the next `count` history fetches fail.
    pub fn fail_next_fetches(&self, count: usize) {
        self.lock().failing_fetches = count;
    }

    /// Make the next `count` sends fail.
    pub fn fail_next_sends(&self, count: usize) {
        self.lock().failing_sends = count;
    }

    /// Live subscribers of one room.
    pub fn subscriber_count(&self, conversation: &ConversationId) -> usize {
        self.lock().rooms.get(conversation).map_or(0, Vec::len)
    }

    /// Every stored message of a conversation, oldest first.
    pub fn history(&self, conversation: &ConversationId) -> Vec<WireMessage> {
        self.lock()
            .histories
            .get(conversation)
            .cloned()
            .unwrap_or_default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn latency(&self) -> Duration {
        self.lock().latency
    }
}

fn cursor_for(index: usize) -> Option<Cursor> {
    Cursor::new(format!("c{index}")).ok()
}

fn parse_cursor(cursor: &Cursor) -> Option<usize> {
    cursor.as_str().strip_prefix('c')?.parse().ok()
}

impl HistoryApi for MemoryBackend {
    fn load_page(
        &self,
        conversation: &ConversationId,
        cursor: Option<&Cursor>,
    ) -> Result<HistoryPage, FetchError> {
        thread::sleep(self.latency());
        let mut inner = self.lock();

        if inner.failing_fetches > 0 {
            inner.failing_fetches -= 1;
            return Err(FetchError::Network("simulated outage".to_string()));
        }

        let history = inner
            .histories
            .get(conversation)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let end = match cursor {
            None => history.len(),
            Some(cursor) => parse_cursor(cursor)
                .ok_or(FetchError::Rejected { status: 400 })?
                .min(history.len()),
        };
        let start = end.saturating_sub(inner.page_size);

        let items = history[start..end].iter().rev().cloned().collect();
        let next_cursor = if start > 0 { cursor_for(start) } else { None };
        debug!(%conversation, start, end, "Serving history page");
        Ok(HistoryPage { items, next_cursor })
    }
}

impl SendApi for MemoryBackend {
    fn send(&self, request: &SendRequest) -> Result<(), SendError> {
        thread::sleep(self.latency());
        let auto_reply = {
            let mut inner = self.lock();
            if inner.failing_sends > 0 {
                inner.failing_sends -= 1;
                return Err(SendError::Network("simulated outage".to_string()));
            }
            if request.text.trim().is_empty() {
                return Err(SendError::Rejected {
                    reason: "empty message".to_string(),
                });
            }

            let id = inner.mint_id()?;
            let echo = WireMessage::new(id, request.text.clone(), Utc::now(), Sender::Page);
            inner.append(&request.recipient, echo);
            inner.auto_reply
        };

        if auto_reply {
            let backend = self.clone();
            let conversation = request.recipient.clone();
            let reply = format!("re: {}", request.text);
            thread::spawn(move || {
                thread::sleep(backend.latency());
                let _ = backend.contact_says(&conversation, reply);
            });
        }
        Ok(())
    }
}

impl PushChannel for MemoryBackend {
    fn subscribe(&self, conversation: &ConversationId) -> Result<Subscription, ChannelError> {
        let (tx, rx) = mpsc::channel();
        let id = {
            let mut inner = self.lock();
            inner.next_subscriber += 1;
            let id = inner.next_subscriber;
            inner
                .rooms
                .entry(conversation.clone())
                .or_default()
                .push((id, tx));
            id
        };
        info!(%conversation, subscriber = id, "Joined push room");

        let backend = self.clone();
        let room = conversation.clone();
        Ok(Subscription::new(conversation.clone(), rx, move || {
            let mut inner = backend.lock();
            if let Some(subscribers) = inner.rooms.get_mut(&room) {
                subscribers.retain(|(subscriber, _)| *subscriber != id);
                if subscribers.is_empty() {
                    inner.rooms.remove(&room);
                    debug!(conversation = %room, "Closed empty push room");
                }
            }
        }))
    }
}
