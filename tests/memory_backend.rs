//! Sessions against the simulated backend through the public API.
//!
//! Covers the shell-level behaviours: conversation switching, request
//! timeouts, auto-replies and recovery after a failed history fetch.

use convsync::model::{ConversationId, Sender};
use convsync::source::seed::read_seed;
use convsync::source::{ConversationSession, Driver, MemoryBackend};
use convsync::state::FailedSendPolicy;
use std::io::Cursor;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn conversation(raw: &str) -> ConversationId {
    ConversationId::new(raw).unwrap()
}

fn open(backend: &MemoryBackend, room: &str, timeout: Duration) -> ConversationSession {
    let shared = Arc::new(backend.clone());
    let driver = Driver::new(shared.clone(), shared.clone(), timeout);
    let (session, _) =
        ConversationSession::open(conversation(room), driver, shared, FailedSendPolicy::Discard);
    session
}

fn pump_until(session: &mut ConversationSession, done: impl Fn(&ConversationSession) -> bool) {
    let deadline = Instant::now() + Duration::from_secs(2);
    while !done(session) {
        assert!(Instant::now() < deadline, "Timed out waiting for session");
        if session.pump_one().is_none() {
            thread::sleep(Duration::from_millis(5));
        }
    }
}

fn seed_lines(count: usize) -> String {
    (0..count)
        .map(|i| {
            format!(
                r#"{{"id":"s{i}","text":"line {i}","createdAt":"2025-03-01T09:{i:02}:00Z","sender":{{"isPage":{}}}}}"#,
                i % 2 == 1
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn seeded_history_pages_back_to_the_first_message() {
    let seed = read_seed(Cursor::new(seed_lines(7))).unwrap();
    assert!(seed.errors.is_empty());
    let backend = MemoryBackend::new().with_page_size(3);
    backend.seed(&conversation("lead-1"), seed.messages);

    let mut session = open(&backend, "lead-1", Duration::from_secs(5));
    pump_until(&mut session, |s| s.state().history().has_fetched());
    while !session.state().history().is_exhausted() {
        assert!(session.load_older());
        pump_until(&mut session, |s| !s.state().history().is_loading());
    }

    let texts: Vec<&str> = session.state().messages().iter().map(|m| m.text()).collect();
    let expected: Vec<String> = (0..7).map(|i| format!("line {i}")).collect();
    assert_eq!(texts, expected);
}

#[test]
fn switching_conversations_leaves_the_previous_room() {
    let backend = MemoryBackend::new();
    let mut session = open(&backend, "lead-1", Duration::from_secs(5));
    assert_eq!(backend.subscriber_count(&conversation("lead-1")), 1);

    session.switch_to(conversation("lead-2"));
    pump_until(&mut session, |s| s.state().history().has_fetched());
    backend.contact_says(&conversation("lead-1"), "still there?").unwrap();
    thread::sleep(Duration::from_millis(20));
    while session.pump_one().is_some() {}

    assert_eq!(backend.subscriber_count(&conversation("lead-1")), 0);
    assert!(session.state().messages().is_empty());
}

#[test]
fn slow_requests_time_out_through_the_driver() {
    let backend = MemoryBackend::new().with_latency(Duration::from_millis(300));
    let mut session = open(&backend, "lead-1", Duration::from_millis(20));

    pump_until(&mut session, |s| !s.state().history().is_loading());
    assert!(!session.state().history().has_fetched());

    session.send("ping").unwrap();
    pump_until(&mut session, |s| s.state().outbox().is_empty());
    assert!(session.state().messages().is_empty(), "Timed-out send is discarded");
}

#[test]
fn auto_reply_follows_the_confirmed_echo() {
    let backend = MemoryBackend::new().with_auto_reply(true);
    let mut session = open(&backend, "lead-1", Duration::from_secs(5));
    pump_until(&mut session, |s| s.state().history().has_fetched());

    session.send("is it available?").unwrap();
    pump_until(&mut session, |s| s.state().messages().len() == 2);

    let messages: Vec<_> = session.state().messages().iter().collect();
    assert_eq!(messages[0].sender(), Sender::Page);
    assert!(messages[0].server_id().is_some());
    assert_eq!(messages[1].sender(), Sender::Contact);
    assert_eq!(messages[1].text(), "re: is it available?");
}

#[test]
fn older_page_can_be_requested_again_after_a_failure() {
    let backend = MemoryBackend::new().with_page_size(2);
    backend.seed(
        &conversation("lead-1"),
        read_seed(Cursor::new(seed_lines(4))).unwrap().messages,
    );
    let mut session = open(&backend, "lead-1", Duration::from_secs(5));
    pump_until(&mut session, |s| s.state().history().has_fetched());

    backend.fail_next_fetches(1);
    assert!(session.load_older());
    pump_until(&mut session, |s| !s.state().history().is_loading());
    assert_eq!(session.state().messages().len(), 2);

    assert!(session.load_older());
    pump_until(&mut session, |s| !s.state().history().is_loading());
    assert_eq!(session.state().messages().len(), 4);
}
