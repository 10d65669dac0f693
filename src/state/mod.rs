//! Conversation synchronization state (pure).
//!
//! All state transitions are pure functions testable without a backend or TUI.

pub mod auto_scroll;
pub mod buffer;
pub mod conversation;
pub mod history;
pub mod live;
pub mod outbox;

// Re-export for convenience
pub use auto_scroll::AutoScrollPolicy;
pub use buffer::MessageBuffer;
pub use conversation::{ConversationState, OutboundSend, SyncUpdate};
pub use history::{CursorKey, Frontier, HistoryLoader};
pub use live::PushDisposition;
pub use outbox::{FailedSendPolicy, Outbox};
