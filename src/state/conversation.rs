//! Conversation view synchronizer (pure core).
//!
//! [`ConversationState`] owns the message buffer of one open conversation and
//! applies the three kinds of input that can change it:
//!
//! - resolved history pages ([`ConversationState::apply_page`]), prepended
//!   oldest first and deduplicated by cursor key
//! - local sends ([`ConversationState::send`]), materialized as pending
//!   placeholders, and their failures ([`ConversationState::send_failed`])
//! - push events ([`ConversationState::apply_push`]), which confirm the oldest
//!   placeholder or append a new message
//!
//! Every method returns a [`SyncUpdate`] telling the shell what changed and
//! whether the viewport must jump to the newest message. No I/O happens here;
//! completions may arrive in any order and each one is applied atomically.

use crate::model::{
    ConversationId, FetchError, HistoryPage, LocalId, Message, MessageId, Notice, PushEvent,
    SendError, SendRequest, Sender, WireMessage,
};
use crate::state::auto_scroll::AutoScrollPolicy;
use crate::state::buffer::MessageBuffer;
use crate::state::history::{CursorKey, HistoryLoader};
use crate::state::live::{self, PushDisposition};
use crate::state::outbox::{self, FailedSendPolicy, Outbox};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Outcome of applying one input to the conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncUpdate {
    /// Messages inserted at the front (older history).
    pub prepended: usize,
    /// Whether the buffer was mutated at all.
    pub changed: bool,
    /// Whether the viewport must jump to the newest message.
    pub scroll_to_bottom: bool,
    /// Notification to surface to the user.
    pub notice: Option<Notice>,
}

impl SyncUpdate {
    fn with_notice(notice: Notice) -> Self {
        Self {
            notice: Some(notice),
            ..Self::default()
        }
    }
}

/// A send the shell must issue to the Send API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundSend {
    /// Placeholder that stands for this send in the thread.
    pub local: LocalId,
    pub request: SendRequest,
}

#[derive(Debug, Clone)]
pub struct ConversationState {
    conversation: ConversationId,
    buffer: MessageBuffer,
    history: HistoryLoader,
    outbox: Outbox,
    auto_scroll: AutoScrollPolicy,
    failed_sends: FailedSendPolicy,
    /// Server ids already delivered on the push channel.
    pushed: HashSet<MessageId>,
}

impl ConversationState {
    /// Empty state for a freshly opened conversation view.
    pub fn new(conversation: ConversationId, failed_sends: FailedSendPolicy) -> Self {
        Self {
            conversation,
            buffer: MessageBuffer::new(),
            history: HistoryLoader::new(),
            outbox: Outbox::new(),
            auto_scroll: AutoScrollPolicy::new(),
            failed_sends,
            pushed: HashSet::new(),
        }
    }

    pub fn conversation(&self) -> &ConversationId {
        &self.conversation
    }

    pub fn messages(&self) -> &MessageBuffer {
        &self.buffer
    }

    pub fn history(&self) -> &HistoryLoader {
        &self.history
    }

    pub fn outbox(&self) -> &Outbox {
        &self.outbox
    }

    pub fn should_auto_scroll(&self) -> bool {
        self.auto_scroll.should_auto_scroll()
    }

    // ===== History Loader =====

    /// Key of the initial page to fetch, if a request is allowed now.
    pub fn request_initial_page(&mut self) -> Option<CursorKey> {
        self.history.begin_initial()
    }

    /// Key of the next older page to fetch, if a request is allowed now.
    pub fn request_older_page(&mut self) -> Option<CursorKey> {
        self.history.begin_older()
    }

    /// Merge the resolution of a page request.
    ///
    /// A page already merged under the same key is a no-op. A failure leaves
    /// the buffer and cursor-used set untouched and yields an error notice.
    pub fn apply_page(
        &mut self,
        key: CursorKey,
        result: Result<HistoryPage, FetchError>,
    ) -> SyncUpdate {
        let page = match result {
            Ok(page) => page,
            Err(error) => {
                self.history.reject(&key);
                warn!(conversation = %self.conversation, ?key, %error, "History page failed to load");
                return SyncUpdate::with_notice(Notice::error(format!(
                    "Could not load messages: {error}"
                )));
            }
        };

        let HistoryPage { items, next_cursor } = page;
        if !self.history.accept(&key, next_cursor) {
            return SyncUpdate::default();
        }

        let received = items.len();
        let oldest_first: Vec<Message> = items
            .into_iter()
            .rev()
            .map(WireMessage::into_message)
            .collect();
        let prepended = self.buffer.prepend(oldest_first);
        debug!(
            conversation = %self.conversation,
            ?key,
            received,
            prepended,
            exhausted = self.history.is_exhausted(),
            "Merged history page"
        );

        let scroll_to_bottom = self.auto_scroll.on_buffer_changed(self.history.has_fetched());
        SyncUpdate {
            prepended,
            changed: prepended > 0,
            scroll_to_bottom,
            notice: None,
        }
    }

    // ===== Optimistic Send Tracker =====

    /// Materialize a pending placeholder for `text`.
    ///
    /// Returns `None` for empty or whitespace-only text.
    pub fn send(&mut self, text: &str) -> Option<(OutboundSend, SyncUpdate)> {
        self.send_at(text, Utc::now())
    }

    /// [`send`](Self::send) with an explicit creation time.
    pub fn send_at(&mut self, text: &str, now: DateTime<Utc>) -> Option<(OutboundSend, SyncUpdate)> {
        if !outbox::is_sendable(text) {
            debug!("Ignoring empty send");
            return None;
        }

        let local = self.outbox.next_local_id(now);
        self.outbox.enqueue(local);
        self.buffer.push(Message::placeholder(local, text, now));
        self.auto_scroll.force();
        let scroll_to_bottom = self.auto_scroll.on_buffer_changed(self.history.has_fetched());
        debug!(conversation = %self.conversation, %local, pending = self.outbox.len(), "Queued optimistic send");

        let outbound = OutboundSend {
            local,
            request: SendRequest {
                recipient: self.conversation.clone(),
                text: text.to_string(),
            },
        };
        let update = SyncUpdate {
            changed: true,
            scroll_to_bottom,
            ..SyncUpdate::default()
        };
        Some((outbound, update))
    }

    /// The server accepted the send. Confirmation itself arrives by push.
    pub fn send_accepted(&mut self, local: LocalId) {
        debug!(conversation = %self.conversation, %local, "Send accepted, awaiting echo");
    }

    /// The send request for `local` was rejected.
    ///
    /// The placeholder leaves the pending queue and, depending on the
    /// [`FailedSendPolicy`], is removed from the thread or marked failed.
    pub fn send_failed(&mut self, local: LocalId, error: &SendError) -> SyncUpdate {
        if !self.outbox.remove(local) {
            warn!(conversation = %self.conversation, %local, %error, "Send failure for a message that is no longer pending");
            return SyncUpdate::default();
        }
        warn!(conversation = %self.conversation, %local, %error, "Send failed");

        let notice = Notice::error(format!("Message not sent: {error}"));
        let Some(index) = self.buffer.position_of_local(local) else {
            return SyncUpdate::with_notice(notice);
        };

        match self.failed_sends {
            FailedSendPolicy::Discard => {
                self.buffer.remove_at(index);
            }
            FailedSendPolicy::Retain => {
                self.buffer.fail_at(index, &error.to_string());
            }
        }

        SyncUpdate {
            changed: true,
            notice: Some(notice),
            ..SyncUpdate::default()
        }
    }

    /// Re-send a retained failed message as a fresh placeholder at the tail.
    pub fn retry(&mut self, local: LocalId) -> Option<(OutboundSend, SyncUpdate)> {
        self.retry_at(local, Utc::now())
    }

    /// [`retry`](Self::retry) with an explicit creation time.
    pub fn retry_at(
        &mut self,
        local: LocalId,
        now: DateTime<Utc>,
    ) -> Option<(OutboundSend, SyncUpdate)> {
        let index = self.buffer.position_of_local(local)?;
        if !self.buffer.get(index)?.is_failed() {
            return None;
        }
        let failed = self.buffer.remove_at(index)?;
        debug!(conversation = %self.conversation, %local, "Retrying failed send");
        self.send_at(failed.text(), now)
    }

    /// Most recent failed message, if any.
    pub fn last_failed(&self) -> Option<LocalId> {
        self.buffer
            .iter()
            .rev()
            .find(|m| m.is_failed())
            .and_then(Message::local_id)
    }

    // ===== Live Event Merger =====

    /// Merge one push event.
    pub fn apply_push(&mut self, event: PushEvent) -> SyncUpdate {
        let disposition = live::classify(
            &self.conversation,
            &event,
            &self.buffer,
            &self.outbox,
            &self.pushed,
        );
        if disposition.is_applied() {
            self.pushed.insert(event.message.id.clone());
        }

        match disposition {
            PushDisposition::Foreign | PushDisposition::Duplicate => {
                debug!(
                    conversation = %self.conversation,
                    event_conversation = %event.conversation_id,
                    id = %event.message.id,
                    ?disposition,
                    "Dropping push event"
                );
                return SyncUpdate::default();
            }
            PushDisposition::Supersede(local) => {
                self.auto_scroll.force();
                self.outbox.pop_oldest();
                if let Some(index) = self.buffer.position_of_local(local) {
                    self.buffer.remove_at(index);
                }
                debug!(conversation = %self.conversation, %local, id = %event.message.id, "Pending send already present from history");
            }
            PushDisposition::ResolvePending(local) => {
                self.auto_scroll.force();
                self.outbox.pop_oldest();
                self.resolve_pending(local, event.message);
            }
            PushDisposition::AppendEcho | PushDisposition::AppendInbound => {
                self.auto_scroll.force();
                self.buffer.push(event.message.into_message());
            }
        }

        let scroll_to_bottom = self.auto_scroll.on_buffer_changed(self.history.has_fetched());
        SyncUpdate {
            changed: true,
            scroll_to_bottom,
            ..SyncUpdate::default()
        }
    }

    /// Confirm placeholder `local` in place with the server's id and time.
    /// The placeholder's text stays authoritative for display.
    fn resolve_pending(&mut self, local: LocalId, echo: WireMessage) {
        let WireMessage {
            id, text, created_at, ..
        } = echo;

        match self.buffer.position_of_local(local) {
            Some(index) => {
                debug!(conversation = %self.conversation, %local, %id, "Confirmed pending send");
                self.buffer.confirm_at(index, id, created_at);
            }
            None => {
                warn!(conversation = %self.conversation, %local, %id, "Pending placeholder vanished, appending echo");
                self.append_confirmed(id, text, created_at);
            }
        }
    }

    fn append_confirmed(&mut self, id: MessageId, text: String, created_at: DateTime<Utc>) {
        self.buffer
            .push(Message::confirmed(id, text, created_at, Sender::Page));
    }
}

#[cfg(test)]
#[path = "conversation_tests.rs"]
mod tests;
