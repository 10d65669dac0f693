//! Event loop tests against the in-memory backend.

use super::*;
use crate::model::{ConversationId, MessageId, Sender, WireMessage};
use crate::source::{Driver, MemoryBackend};
use crate::state::FailedSendPolicy;
use chrono::{TimeZone, Utc};
use ratatui::backend::TestBackend;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn conversation() -> ConversationId {
    ConversationId::new("lead-1").unwrap()
}

fn history(count: usize) -> Vec<WireMessage> {
    (0..count)
        .map(|i| {
            WireMessage::new(
                MessageId::new(format!("h{i}")).unwrap(),
                format!("history {i}"),
                Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap(),
                Sender::Contact,
            )
        })
        .collect()
}

/// 40x12 app: ten thread rows, one status row, one composer row.
fn create_test_app(backend: &MemoryBackend) -> TuiApp<TestBackend> {
    let shared = Arc::new(backend.clone());
    let driver = Driver::new(shared.clone(), shared.clone(), Duration::from_secs(5));
    let (session, _) =
        ConversationSession::open(conversation(), driver, shared, FailedSendPolicy::Discard);
    let terminal = Terminal::new(TestBackend::new(40, 12)).unwrap();
    let settings = ViewSettings {
        top_threshold: 2,
        colors: ColorConfig::from_env_and_args(true),
    };
    TuiApp::with_terminal(terminal, session, settings).unwrap()
}

fn pump_until(app: &mut TuiApp<TestBackend>, done: impl Fn(&TuiApp<TestBackend>) -> bool) {
    let deadline = Instant::now() + Duration::from_secs(2);
    while !done(app) {
        assert!(Instant::now() < deadline, "Timed out waiting for app");
        if !app.pump() {
            thread::sleep(Duration::from_millis(5));
        }
    }
}

fn loaded(app: &TuiApp<TestBackend>) -> bool {
    app.session().state().history().has_fetched()
}

fn press(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn type_text(app: &mut TuiApp<TestBackend>, text: &str) {
    for ch in text.chars() {
        app.handle_key(press(KeyCode::Char(ch)));
    }
}

fn row(app: &TuiApp<TestBackend>, y: u16) -> String {
    let buffer = app.terminal().backend().buffer();
    (0..buffer.area.width)
        .map(|x| buffer[(x, y)].symbol())
        .collect::<String>()
        .trim_end()
        .to_string()
}

#[test]
fn tui_error_from_io_error() {
    let io_err = io::Error::other("test error");
    let tui_err: TuiError = io_err.into();
    assert!(matches!(tui_err, TuiError::Io(_)));
}

#[test]
fn initial_load_scrolls_to_newest() {
    let backend = MemoryBackend::new().with_page_size(20);
    backend.seed(&conversation(), history(30));
    let mut app = create_test_app(&backend);

    pump_until(&mut app, loaded);

    assert_eq!(app.session().state().messages().len(), 20);
    assert!(app.viewport().is_at_bottom());
}

#[test]
fn scrolling_to_top_prepends_without_moving_the_reader() {
    let backend = MemoryBackend::new().with_page_size(20);
    backend.seed(&conversation(), history(30));
    let mut app = create_test_app(&backend);
    pump_until(&mut app, loaded);

    app.handle_key(press(KeyCode::Home));
    let first_visible = app.viewport().visible_range().start_index;
    pump_until(&mut app, |app| app.session().state().messages().len() == 30);

    // The message that was on top is still on top, now ten slots further down.
    assert_eq!(first_visible, 0);
    assert_eq!(app.viewport().visible_range().start_index, 10);
    assert!(!app.viewport().is_at_bottom());
    assert!(app.session().state().history().is_exhausted());
}

#[test]
fn enter_sends_and_clears_composer() {
    let backend = MemoryBackend::new();
    let mut app = create_test_app(&backend);
    pump_until(&mut app, loaded);

    type_text(&mut app, "hi there");
    app.handle_key(press(KeyCode::Enter));

    assert!(app.composer().is_empty());
    let last = app.session().state().messages().last().unwrap();
    assert!(last.is_pending());
    assert!(app.viewport().is_at_bottom());

    pump_until(&mut app, |app| app.session().state().outbox().is_empty());
    let last = app.session().state().messages().last().unwrap();
    assert_eq!(last.text(), "hi there");
    assert!(last.server_id().is_some());
}

#[test]
fn blank_enter_sends_nothing() {
    let backend = MemoryBackend::new();
    let mut app = create_test_app(&backend);
    pump_until(&mut app, loaded);

    type_text(&mut app, "   ");
    app.handle_key(press(KeyCode::Enter));

    assert!(app.composer().is_empty());
    assert!(app.session().state().messages().is_empty());
}

#[test]
fn failed_send_shows_error_notice() {
    let backend = MemoryBackend::new();
    let mut app = create_test_app(&backend);
    pump_until(&mut app, loaded);
    backend.fail_next_sends(1);

    type_text(&mut app, "hello");
    app.handle_key(press(KeyCode::Enter));
    pump_until(&mut app, |app| app.notice().is_some());

    assert!(app.notice().unwrap().is_error());
    assert!(app.session().state().messages().is_empty());
}

#[test]
fn quit_keys() {
    let backend = MemoryBackend::new();
    let mut app = create_test_app(&backend);

    assert!(app.handle_key(press(KeyCode::Esc)));
    assert!(app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
    assert!(!app.handle_key(press(KeyCode::Char('c'))));
}

#[test]
fn key_release_is_ignored() {
    let backend = MemoryBackend::new();
    let mut app = create_test_app(&backend);

    let release = KeyEvent::new_with_kind(KeyCode::Char('x'), KeyModifiers::NONE, KeyEventKind::Release);
    app.handle_key(release);

    assert!(app.composer().is_empty());
}

#[test]
fn draw_lays_out_thread_status_and_composer() {
    let backend = MemoryBackend::new().with_page_size(20);
    backend.seed(&conversation(), history(30));
    let mut app = create_test_app(&backend);
    pump_until(&mut app, loaded);
    type_text(&mut app, "draft");

    app.draw().unwrap();

    assert_eq!(row(&app, 8), "09:00 contact");
    assert_eq!(row(&app, 9), "  history 29");
    assert_eq!(row(&app, 10), "[LIVE] lead-1 | 20 messages");
    assert_eq!(row(&app, 11), "> draft");
}

#[test]
fn resize_keeps_reader_at_bottom() {
    let backend = MemoryBackend::new().with_page_size(20);
    backend.seed(&conversation(), history(30));
    let mut app = create_test_app(&backend);
    pump_until(&mut app, loaded);

    app.handle_resize(30, 20);

    assert_eq!(app.viewport().dimensions(), ViewportDimensions::new(30, 18));
    assert!(app.viewport().is_at_bottom());
}
