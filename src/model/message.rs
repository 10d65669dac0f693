//! Chat message types.
//!
//! A [`Message`] is one entry of the conversation thread. Its delivery state is
//! a tagged union: identity (server id or local id) lives inside the variant, so
//! a confirmed message always has a server id and a pending one never does.

use crate::model::{LocalId, MessageId};
use chrono::{DateTime, Utc};

// ===== Sender =====

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    /// Outbound, written by the operator of the page (wire `isPage: true`).
    Page,
    /// Inbound, written by the remote contact (wire `isPage: false`).
    Contact,
}

impl Sender {
    pub fn from_is_page(is_page: bool) -> Self {
        if is_page {
            Self::Page
        } else {
            Self::Contact
        }
    }

    pub fn is_page(self) -> bool {
        matches!(self, Self::Page)
    }
}

// ===== Delivery =====

/// Delivery state of a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Known to the server. Carries the server-assigned id.
    Confirmed {
        /// Server-issued identifier.
        id: MessageId,
    },
    /// Optimistic placeholder; the send request is in flight or awaiting its echo.
    Pending {
        /// Synthetic local identifier.
        local: LocalId,
    },
    /// The send request was rejected and the placeholder was kept for retry.
    Failed {
        /// Synthetic local identifier of the failed placeholder.
        local: LocalId,
        /// Human-readable failure reason.
        reason: String,
    },
}

// ===== Message =====

/// One entry of the conversation thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    delivery: Delivery,
    text: String,
    created_at: DateTime<Utc>,
    sender: Sender,
}

impl Message {
    /// A message known to the server.
    pub fn confirmed(
        id: MessageId,
        text: impl Into<String>,
        created_at: DateTime<Utc>,
        sender: Sender,
    ) -> Self {
        Self {
            delivery: Delivery::Confirmed { id },
            text: text.into(),
            created_at,
            sender,
        }
    }

    /// An optimistic placeholder for an outbound send.
    pub fn placeholder(local: LocalId, text: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            delivery: Delivery::Pending { local },
            text: text.into(),
            created_at,
            sender: Sender::Page,
        }
    }

    pub fn delivery(&self) -> &Delivery {
        &self.delivery
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn sender(&self) -> Sender {
        self.sender
    }

    /// Server id, if the message is confirmed.
    pub fn server_id(&self) -> Option<&MessageId> {
        match &self.delivery {
            Delivery::Confirmed { id } => Some(id),
            Delivery::Pending { .. } | Delivery::Failed { .. } => None,
        }
    }

    /// Local id, if the message is a pending or failed placeholder.
    pub fn local_id(&self) -> Option<LocalId> {
        match &self.delivery {
            Delivery::Confirmed { .. } => None,
            Delivery::Pending { local } | Delivery::Failed { local, .. } => Some(*local),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.delivery, Delivery::Pending { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.delivery, Delivery::Failed { .. })
    }

    /// Turn a placeholder into a confirmed message, keeping its text.
    pub(crate) fn confirm(&mut self, id: MessageId, created_at: DateTime<Utc>) {
        self.delivery = Delivery::Confirmed { id };
        self.created_at = created_at;
    }

    /// Mark a pending placeholder as failed. No-op for other states.
    pub(crate) fn fail(&mut self, reason: impl Into<String>) {
        if let Delivery::Pending { local } = self.delivery {
            self.delivery = Delivery::Failed {
                local,
                reason: reason.into(),
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 10, minute, 0).unwrap()
    }

    #[test]
    fn sender_maps_is_page_flag() {
        assert_eq!(Sender::from_is_page(true), Sender::Page);
        assert_eq!(Sender::from_is_page(false), Sender::Contact);
        assert!(Sender::Page.is_page());
        assert!(!Sender::Contact.is_page());
    }

    #[test]
    fn placeholder_is_pending_from_page() {
        let msg = Message::placeholder(LocalId::new(1), "hello", at(0));
        assert!(msg.is_pending());
        assert_eq!(msg.sender(), Sender::Page);
        assert_eq!(msg.local_id(), Some(LocalId::new(1)));
        assert_eq!(msg.server_id(), None);
    }

    #[test]
    fn confirm_replaces_identity_and_keeps_text() {
        let mut msg = Message::placeholder(LocalId::new(1), "hello", at(0));
        msg.confirm(MessageId::new("srv-1").unwrap(), at(1));

        assert_eq!(msg.server_id().map(MessageId::as_str), Some("srv-1"));
        assert_eq!(msg.local_id(), None);
        assert_eq!(msg.text(), "hello");
        assert_eq!(msg.created_at(), at(1));
    }

    #[test]
    fn fail_marks_pending_placeholder() {
        let mut msg = Message::placeholder(LocalId::new(3), "oops", at(0));
        msg.fail("network down");

        assert!(msg.is_failed());
        assert_eq!(msg.local_id(), Some(LocalId::new(3)));
        assert_eq!(
            msg.delivery(),
            &Delivery::Failed {
                local: LocalId::new(3),
                reason: "network down".to_string()
            }
        );
    }

    #[test]
    fn fail_leaves_confirmed_message_alone() {
        let mut msg = Message::confirmed(MessageId::new("srv-9").unwrap(), "hi", at(0), Sender::Contact);
        msg.fail("ignored");
        assert!(!msg.is_failed());
        assert_eq!(msg.server_id().map(MessageId::as_str), Some("srv-9"));
    }
}
