//! One open conversation: synchronizer state, push subscription and driver.
//!
//! The session owns the only mutable [`ConversationState`]. Collaborator
//! results reach it one at a time through [`ConversationSession::pump_one`],
//! so the caller can capture the viewport before each merge and react to each
//! [`SyncUpdate`] separately.

use crate::model::{ConversationId, LocalId, Notice};
use crate::source::driver::{Completion, Driver};
use crate::source::{PushChannel, Subscription};
use crate::state::{ConversationState, FailedSendPolicy, SyncUpdate};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct ConversationSession {
    state: ConversationState,
    subscription: Option<Subscription>,
    driver: Driver,
    channel: Arc<dyn PushChannel>,
    failed_sends: FailedSendPolicy,
}

impl ConversationSession {
    /// Open `conversation`: join its push room and request the first page.
    ///
    /// The returned update carries a notice if the push room could not be
    /// joined; history still loads in that case.
    pub fn open(
        conversation: ConversationId,
        driver: Driver,
        channel: Arc<dyn PushChannel>,
        failed_sends: FailedSendPolicy,
    ) -> (Self, SyncUpdate) {
        let mut session = Self {
            state: ConversationState::new(conversation, failed_sends),
            subscription: None,
            driver,
            channel,
            failed_sends,
        };
        let update = session.join();
        (session, update)
    }

    /// Close the current conversation and open another.
    ///
    /// The previous subscription is dropped (and so disconnected) before the
    /// new room is joined. Completions still in flight for the previous
    /// conversation are ignored when they arrive.
    pub fn switch_to(&mut self, conversation: ConversationId) -> SyncUpdate {
        info!(from = %self.state.conversation(), to = %conversation, "Switching conversation");
        self.subscription = None;
        self.state = ConversationState::new(conversation, self.failed_sends);
        self.join()
    }

    fn join(&mut self) -> SyncUpdate {
        let conversation = self.state.conversation().clone();
        let mut update = SyncUpdate::default();

        match self.channel.subscribe(&conversation) {
            Ok(subscription) => self.subscription = Some(subscription),
            Err(error) => {
                warn!(%conversation, %error, "Could not join push room");
                update.notice = Some(Notice::error(format!("Live updates unavailable: {error}")));
            }
        }

        if let Some(key) = self.state.request_initial_page() {
            self.driver.fetch(&conversation, key);
        }
        update
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    pub fn conversation(&self) -> &ConversationId {
        self.state.conversation()
    }

    /// Whether the push subscription is connected.
    pub fn is_live(&self) -> bool {
        self.subscription.is_some()
    }

    /// Request the next older page if the loader allows it now.
    ///
    /// Until a first page has been merged this re-requests the initial page
    /// instead, so a failed initial load is retried by scrolling up.
    pub fn load_older(&mut self) -> bool {
        let request = if self.state.history().has_fetched() {
            self.state.request_older_page()
        } else {
            self.state.request_initial_page()
        };
        match request {
            Some(key) => {
                self.driver.fetch(self.state.conversation(), key);
                true
            }
            None => false,
        }
    }

    /// Send `text` optimistically. `None` if the text is blank.
    pub fn send(&mut self, text: &str) -> Option<SyncUpdate> {
        let (outbound, update) = self.state.send(text)?;
        self.driver.send(outbound);
        Some(update)
    }

    /// Re-send a retained failed message.
    pub fn retry(&mut self, local: LocalId) -> Option<SyncUpdate> {
        let (outbound, update) = self.state.retry(local)?;
        self.driver.send(outbound);
        Some(update)
    }

    /// Re-send the most recent failed message, if any.
    pub fn retry_last_failed(&mut self) -> Option<SyncUpdate> {
        let local = self.state.last_failed()?;
        self.retry(local)
    }

    /// Apply at most one pending input: a driver completion or a push event.
    ///
    /// Returns `None` when nothing is waiting.
    pub fn pump_one(&mut self) -> Option<SyncUpdate> {
        while let Some(completion) = self.driver.poll() {
            if completion.conversation() != self.state.conversation() {
                debug!(stale = %completion.conversation(), "Ignoring completion for closed conversation");
                continue;
            }
            return Some(self.apply_completion(completion));
        }

        let next = self.subscription.as_ref()?.try_next();
        match next {
            Ok(Some(event)) => Some(self.state.apply_push(event)),
            Ok(None) => None,
            Err(error) => {
                warn!(conversation = %self.state.conversation(), %error, "Push channel lost");
                self.subscription = None;
                Some(SyncUpdate {
                    notice: Some(Notice::error(format!("Live updates stopped: {error}"))),
                    ..SyncUpdate::default()
                })
            }
        }
    }

    fn apply_completion(&mut self, completion: Completion) -> SyncUpdate {
        match completion {
            Completion::Page { key, result, .. } => self.state.apply_page(key, result),
            Completion::Send { local, result, .. } => match result {
                Ok(()) => {
                    self.state.send_accepted(local);
                    SyncUpdate::default()
                }
                Err(error) => self.state.send_failed(local, &error),
            },
        }
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
