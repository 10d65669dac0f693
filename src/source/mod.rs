//! Collaborators behind the conversation view (impure shell).
//!
//! The synchronizer core never talks to the network. This module defines the
//! three contracts it consumes and the plumbing that feeds their results back
//! into [`ConversationState`](crate::state::ConversationState):
//!
//! - [`HistoryApi`] - cursor-paginated history pages
//! - [`SendApi`] - fire-and-forget outbound sends
//! - [`PushChannel`] - conversation-scoped push subscriptions
//! - [`driver`] - worker threads with request timeouts, completions over mpsc
//! - [`session`] - one open conversation: state + subscription + driver
//! - [`memory`] - in-process simulated backend
//! - [`seed`] - JSONL history for the simulated backend

use crate::model::error::{ChannelError, FetchError, SendError};
use crate::model::{ConversationId, Cursor, HistoryPage, PushEvent, SendRequest};
use std::fmt;
use std::sync::mpsc::{Receiver, TryRecvError};

pub mod driver;
pub mod memory;
pub mod seed;
pub mod session;

pub use driver::{Completion, Driver};
pub use memory::MemoryBackend;
pub use session::ConversationSession;

/// Paginated history of a conversation.
pub trait HistoryApi: Send + Sync {
    /// Load one page. `None` requests the most recent page.
    ///
    /// Items come back newest first; `next_cursor` is absent when no older
    /// page exists.
    fn load_page(
        &self,
        conversation: &ConversationId,
        cursor: Option<&Cursor>,
    ) -> Result<HistoryPage, FetchError>;
}

/// Outbound message submission.
///
/// Success only means the server accepted the request. The canonical message
/// arrives later through the push channel.
pub trait SendApi: Send + Sync {
    fn send(&self, request: &SendRequest) -> Result<(), SendError>;
}

/// Real-time events scoped to one conversation room.
pub trait PushChannel: Send + Sync {
    /// Join the room for `conversation`. Dropping the returned
    /// [`Subscription`] leaves it.
    fn subscribe(&self, conversation: &ConversationId) -> Result<Subscription, ChannelError>;
}

/// Live membership in one conversation room.
///
/// Disconnects when dropped, so closing the view or switching conversations
/// cannot leak a listener.
pub struct Subscription {
    conversation: ConversationId,
    events: Receiver<PushEvent>,
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Wrap a receiver of push events. `release` runs exactly once, on drop.
    pub fn new(
        conversation: ConversationId,
        events: Receiver<PushEvent>,
        release: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            conversation,
            events,
            release: Some(Box::new(release)),
        }
    }

    pub fn conversation(&self) -> &ConversationId {
        &self.conversation
    }

    /// Next delivered event without blocking.
    ///
    /// # Errors
    ///
    /// Returns `ChannelError::Closed` once the sending side has gone away.
    pub fn try_next(&self) -> Result<Option<PushEvent>, ChannelError> {
        match self.events.try_recv() {
            Ok(event) => Ok(Some(event)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(ChannelError::Closed),
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("conversation", &self.conversation)
            .field("connected", &self.release.is_some())
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            tracing::debug!(conversation = %self.conversation, "Leaving push room");
            release();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{mpsc, Arc};

    fn conversation() -> ConversationId {
        ConversationId::new("lead-1").unwrap()
    }

    #[test]
    fn drop_runs_release_once() {
        let released = Arc::new(AtomicUsize::new(0));
        let (_tx, rx) = mpsc::channel();
        let counter = Arc::clone(&released);

        let subscription = Subscription::new(conversation(), rx, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(released.load(Ordering::SeqCst), 0);

        drop(subscription);
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn try_next_is_non_blocking() {
        let (_tx, rx) = mpsc::channel();
        let subscription = Subscription::new(conversation(), rx, || {});

        assert_eq!(subscription.try_next(), Ok(None));
    }

    #[test]
    fn try_next_reports_closed_channel() {
        let (tx, rx) = mpsc::channel::<PushEvent>();
        let subscription = Subscription::new(conversation(), rx, || {});
        drop(tx);

        assert_eq!(subscription.try_next(), Err(ChannelError::Closed));
    }
}
