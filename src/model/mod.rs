//! Domain model types (pure).
//!
//! All types in this module are pure data with smart constructors.

pub mod error;
pub mod identifiers;
pub mod message;
pub mod notice;
pub mod wire;

// Re-export for convenience
pub use error::{ChannelError, FetchError, SeedError, SendError};
pub use identifiers::{
    ConversationId, Cursor, InvalidConversationId, InvalidCursor, InvalidMessageId, LocalId,
    MessageId,
};
pub use message::{Delivery, Message, Sender};
pub use notice::{Notice, NoticeLevel};
pub use wire::{HistoryPage, PushEvent, SendRequest, WireMessage, WireSender};
