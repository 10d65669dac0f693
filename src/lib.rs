//! convsync: Conversation View Synchronizer
//!
//! Keeps the message thread of a live chat panel consistent while three
//! sources change it: cursor-paginated history pages, optimistic local sends
//! and pushed real-time events.
//!
//! Pure Core / Impure Shell:
//! - [`model`], [`state`] and [`view_state`] are pure: no I/O and no
//!   threads.
//! - [`source`] talks to the collaborators; [`view`] owns the terminal.

pub mod config;
pub mod logging;
pub mod model;
pub mod source;
pub mod state;
pub mod view;
pub mod view_state;
