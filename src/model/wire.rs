//! Wire shapes exchanged with the History API, the Send API and the Push Channel.
//!
//! JSON field names follow the backend (camelCase). Parsing happens at the
//! boundary: everything past this module works with [`Message`].

use crate::model::{ConversationId, Cursor, Message, MessageId, Sender};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sender tag as the backend encodes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireSender {
    pub is_page: bool,
}

/// A message as delivered by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireMessage {
    pub id: MessageId,
    /// Empty for non-text payloads.
    #[serde(default)]
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub sender: WireSender,
}

impl WireMessage {
    pub fn new(
        id: MessageId,
        text: impl Into<String>,
        created_at: DateTime<Utc>,
        sender: Sender,
    ) -> Self {
        Self {
            id,
            text: text.into(),
            created_at,
            sender: WireSender {
                is_page: sender.is_page(),
            },
        }
    }

    pub fn sender(&self) -> Sender {
        Sender::from_is_page(self.sender.is_page)
    }

    /// Convert into a confirmed thread message.
    pub fn into_message(self) -> Message {
        let sender = self.sender();
        Message::confirmed(self.id, self.text, self.created_at, sender)
    }
}

/// One page of history. `items` are newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPage {
    pub items: Vec<WireMessage>,
    /// Absent when no older page exists.
    #[serde(default)]
    pub next_cursor: Option<Cursor>,
}

/// A real-time event pushed for one conversation room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushEvent {
    pub conversation_id: ConversationId,
    pub message: WireMessage,
}

/// Body of an outbound send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendRequest {
    pub recipient: ConversationId,
    pub text: String,
}
