//! Error types for the conversation synchronizer.
//!
//! Errors are grouped by the collaborator that produces them. None of them is
//! fatal to the thread view: every failure ends up as a user-facing
//! [`Notice`](crate::model::Notice) at the point where it happened.
//!
//! # Error Hierarchy
//!
//! - [`FetchError`] - History API page loads (transient, no buffer mutation)
//! - [`SendError`] - Outbound Send API requests (placeholder removed or retained)
//! - [`ChannelError`] - Push channel subscription and delivery
//! - [`SeedError`] - Reading JSONL seed history for the simulated backend

use thiserror::Error;

/// Failure to load a page of history.
///
/// The buffer and cursor-used set are left untouched. Retrying is up to the
/// reader (scrolling to the top again triggers a new request).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Transport-level failure (connection refused, reset, ...).
    #[error("network error: {0}")]
    Network(String),

    /// No response within the configured request timeout.
    #[error("request timed out after {after_ms} ms")]
    Timeout {
        /// Timeout that elapsed, in milliseconds.
        after_ms: u64,
    },

    /// The server answered with an error status.
    #[error("server rejected the request (status {status})")]
    Rejected {
        /// HTTP-like status code.
        status: u16,
    },
}

/// Failure of an outbound send.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendError {
    /// Transport-level failure.
    #[error("network error: {0}")]
    Network(String),

    /// No response within the configured request timeout.
    #[error("send timed out after {after_ms} ms")]
    Timeout {
        /// Timeout that elapsed, in milliseconds.
        after_ms: u64,
    },

    /// The server refused the message.
    #[error("send rejected: {reason}")]
    Rejected {
        /// Reason given by the server.
        reason: String,
    },
}

/// Failure of the push channel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    /// The server side of the subscription went away.
    #[error("push channel closed")]
    Closed,

    /// Joining the conversation room failed.
    #[error("push channel unavailable: {0}")]
    Unavailable(String),
}

/// Failure reading JSONL seed history.
///
/// Malformed lines are non-fatal: they are reported with their line number and
/// skipped. Only [`SeedError::Io`] stops loading.
#[derive(Debug, Error)]
pub enum SeedError {
    /// The seed file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A line is not a valid message object.
    #[error("Invalid JSON at line {line}: {message}")]
    InvalidJson {
        /// 1-based line number.
        line: usize,
        /// Parser message.
        message: String,
    },
}
