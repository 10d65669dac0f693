//! Runs collaborator calls off the event loop.
//!
//! Each fetch or send executes on a short-lived worker thread under the
//! configured request timeout. Results come back as [`Completion`]s through a
//! single mpsc channel that the event loop drains without blocking, the same
//! way it polls terminal input.

use crate::model::error::{FetchError, SendError};
use crate::model::{ConversationId, HistoryPage, LocalId};
use crate::source::{HistoryApi, SendApi};
use crate::state::{CursorKey, OutboundSend};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

/// Resolution of one asynchronous collaborator call.
///
/// Tagged with the conversation it was issued for, so results that arrive
/// after the user switched conversations can be ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Page {
        conversation: ConversationId,
        key: CursorKey,
        result: Result<HistoryPage, FetchError>,
    },
    Send {
        conversation: ConversationId,
        local: LocalId,
        result: Result<(), SendError>,
    },
}

impl Completion {
    pub fn conversation(&self) -> &ConversationId {
        match self {
            Self::Page { conversation, .. } | Self::Send { conversation, .. } => conversation,
        }
    }
}

pub struct Driver {
    history: Arc<dyn HistoryApi>,
    sender: Arc<dyn SendApi>,
    timeout: Duration,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
}

impl Driver {
    pub fn new(history: Arc<dyn HistoryApi>, sender: Arc<dyn SendApi>, timeout: Duration) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            history,
            sender,
            timeout,
            tx,
            rx,
        }
    }

    /// Start loading the page identified by `key`.
    pub fn fetch(&self, conversation: &ConversationId, key: CursorKey) {
        let history = Arc::clone(&self.history);
        let tx = self.tx.clone();
        let timeout = self.timeout;
        let conversation = conversation.clone();
        debug!(%conversation, ?key, "Fetching history page");

        thread::spawn(move || {
            let job_conversation = conversation.clone();
            let cursor = key.cursor().cloned();
            let result = run_with_timeout(timeout, move || {
                history.load_page(&job_conversation, cursor.as_ref())
            })
            .unwrap_or(Err(FetchError::Timeout {
                after_ms: millis(timeout),
            }));
            if let Err(error) = &result {
                warn!(%conversation, ?key, %error, "History fetch failed");
            }
            // Receiver gone means the event loop shut down.
            let _ = tx.send(Completion::Page {
                conversation,
                key,
                result,
            });
        });
    }

    /// Submit an outbound send.
    pub fn send(&self, outbound: OutboundSend) {
        let sender = Arc::clone(&self.sender);
        let tx = self.tx.clone();
        let timeout = self.timeout;
        let OutboundSend { local, request } = outbound;
        debug!(conversation = %request.recipient, %local, "Submitting send");

        thread::spawn(move || {
            let conversation = request.recipient.clone();
            let result = run_with_timeout(timeout, move || sender.send(&request)).unwrap_or(
                Err(SendError::Timeout {
                    after_ms: millis(timeout),
                }),
            );
            let _ = tx.send(Completion::Send {
                conversation,
                local,
                result,
            });
        });
    }

    /// Next completion, if one is ready.
    pub fn poll(&self) -> Option<Completion> {
        self.rx.try_recv().ok()
    }

    /// Wait up to `timeout` for the next completion.
    pub fn wait(&self, timeout: Duration) -> Option<Completion> {
        self.rx.recv_timeout(timeout).ok()
    }
}

/// Run `job` on its own thread and wait at most `timeout` for its result.
///
/// Returns `None` on timeout. The job thread is detached and its late result
/// is discarded.
pub fn run_with_timeout<T, F>(timeout: Duration, job: F) -> Option<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = tx.send(job());
    });
    rx.recv_timeout(timeout).ok()
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
