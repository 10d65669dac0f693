//! Classification of push events before they are merged.
//!
//! Pure decision function; the mutation happens in
//! [`ConversationState::apply_push`](crate::state::ConversationState::apply_push).

use crate::model::{ConversationId, LocalId, MessageId, PushEvent, Sender};
use crate::state::{MessageBuffer, Outbox};
use std::collections::HashSet;

/// What to do with one inbound push event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushDisposition {
    /// Scoped to another conversation; drop it.
    Foreign,
    /// Server id already delivered by push (at-least-once redelivery); drop it.
    Duplicate,
    /// Echo of an own send whose message already arrived with a history
    /// page: the history copy stands for the oldest pending placeholder,
    /// which is withdrawn.
    Supersede(LocalId),
    /// Echo of an own send: resolve the oldest pending placeholder.
    ResolvePending(LocalId),
    /// Echo with no pending placeholder (sent from another session); append.
    AppendEcho,
    /// Message from the remote contact; append.
    AppendInbound,
}

impl PushDisposition {
    /// True if applying the event mutates the thread.
    pub fn is_applied(self) -> bool {
        !matches!(self, Self::Foreign | Self::Duplicate)
    }
}

/// Decide how to merge `event`.
///
/// `pushed` holds the server ids already seen on the push channel, which
/// separates a redelivered echo from the first echo of a message that the
/// history page delivered earlier.
pub fn classify(
    open: &ConversationId,
    event: &PushEvent,
    buffer: &MessageBuffer,
    outbox: &Outbox,
    pushed: &HashSet<MessageId>,
) -> PushDisposition {
    if &event.conversation_id != open {
        return PushDisposition::Foreign;
    }
    if buffer.contains_server_id(&event.message.id) {
        return match (event.message.sender(), outbox.peek_oldest()) {
            (Sender::Page, Some(local)) if !pushed.contains(&event.message.id) => {
                PushDisposition::Supersede(local)
            }
            _ => PushDisposition::Duplicate,
        };
    }
    match event.message.sender() {
        Sender::Page => match outbox.peek_oldest() {
            Some(local) => PushDisposition::ResolvePending(local),
            None => PushDisposition::AppendEcho,
        },
        Sender::Contact => PushDisposition::AppendInbound,
    }
}
