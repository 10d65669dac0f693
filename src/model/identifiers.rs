//! Core identifier newtypes with smart constructors.
//!
//! String identifiers validate non-empty input at construction time.
//! Raw constructors are never exported - use smart constructors only.
//! Serde goes through the same constructors via `try_from = "String"`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of one conversation (the push-channel room key).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ConversationId(String);

impl ConversationId {
    /// Smart constructor: validates non-empty conversation ID
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidConversationId> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(InvalidConversationId::Empty);
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ConversationId {
    type Error = InvalidConversationId;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl From<ConversationId> for String {
    fn from(id: ConversationId) -> Self {
        id.0
    }
}

/// Server-issued message identifier. Only confirmed messages carry one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MessageId(String);

impl MessageId {
    /// Smart constructor: validates non-empty message ID
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidMessageId> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(InvalidMessageId::Empty);
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for MessageId {
    type Error = InvalidMessageId;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl From<MessageId> for String {
    fn from(id: MessageId) -> Self {
        id.0
    }
}

/// Opaque pagination token pointing at the next older page.
///
/// The content is never interpreted on this side of the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cursor(String);

impl Cursor {
    /// Smart constructor: validates non-empty cursor token
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidCursor> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(InvalidCursor::Empty);
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Cursor {
    type Error = InvalidCursor;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl From<Cursor> for String {
    fn from(cursor: Cursor) -> Self {
        cursor.0
    }
}

/// Synthetic identifier of a locally created (optimistic) message.
///
/// Derived from the creation time in milliseconds, bumped so that ids are
/// strictly increasing within one conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LocalId(u64);

impl LocalId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "local-{}", self.0)
    }
}

// ===== Error Types =====

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidConversationId {
    #[error("Conversation ID cannot be empty")]
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidMessageId {
    #[error("Message ID cannot be empty")]
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidCursor {
    #[error("Cursor cannot be empty")]
    Empty,
}

// ===== Tests =====

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversation_id_accepts_valid_string() {
        let id = ConversationId::new("lead-42");
        assert!(id.is_ok(), "Valid conversation ID should be accepted");
    }

    #[test]
    fn conversation_id_rejects_empty_string() {
        assert_eq!(ConversationId::new(""), Err(InvalidConversationId::Empty));
    }

    #[test]
    fn conversation_id_display_returns_inner_string() {
        let id = ConversationId::new("lead-42").expect("valid id");
        assert_eq!(id.to_string(), "lead-42");
        assert_eq!(id.as_str(), "lead-42");
    }

    #[test]
    fn message_id_rejects_empty_string() {
        assert_eq!(MessageId::new(""), Err(InvalidMessageId::Empty));
    }

    #[test]
    fn message_id_accepts_owned_string() {
        let id = MessageId::new(String::from("srv-1")).expect("valid id");
        assert_eq!(id.as_str(), "srv-1");
    }

    #[test]
    fn cursor_named_initial_is_an_ordinary_token() {
        let cursor = Cursor::new("initial").expect("valid cursor");
        assert_eq!(cursor.as_str(), "initial");
    }

    #[test]
    fn cursor_rejects_empty_string() {
        assert_eq!(Cursor::new(""), Err(InvalidCursor::Empty));
    }

    #[test]
    fn local_id_displays_with_prefix() {
        assert_eq!(LocalId::new(17).to_string(), "local-17");
    }

    #[test]
    fn local_ids_order_by_value() {
        assert!(LocalId::new(1) < LocalId::new(2));
    }

    #[test]
    fn deserialize_rejects_empty_message_id() {
        let result: Result<MessageId, _> = serde_json::from_str("\"\"");
        assert!(result.is_err(), "Empty id must not deserialize");
    }

    #[test]
    fn serialize_round_trips_through_plain_string() {
        let id = ConversationId::new("room-7").expect("valid id");
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "\"room-7\"");
    }
}
