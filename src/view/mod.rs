//! Terminal chat panel (impure shell)
//!
//! [`TuiApp`] owns the open [`ConversationSession`] and the thread viewport.
//! Every loop iteration drains terminal input, then applies session updates
//! one at a time: the viewport anchor is captured before each merge so a
//! prepended history page can be restored to the same visual position, and
//! the scroll-to-bottom decision of the update is applied after that.

pub mod composer;
pub mod constants;
pub mod live_indicator;
pub mod status;
pub mod styles;
pub mod thread;

pub use composer::{Composer, ComposerView};
pub use live_indicator::LiveIndicator;
pub use status::StatusLine;
pub use styles::{ColorConfig, ThreadStyles};
pub use thread::ThreadView;

use crate::model::Notice;
use crate::source::ConversationSession;
use crate::state::SyncUpdate;
use crate::view_state::{ScrollAnchor, ThreadViewport, ViewportDimensions};
use constants::{
    COMPOSER_HEIGHT, DEFAULT_TOP_THRESHOLD, FALLBACK_WIDTH, MAX_UPDATES_PER_TICK, POLL_INTERVAL,
    STATUS_BAR_HEIGHT,
};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Layout},
    Terminal,
};
use std::io::{self, Stdout};
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur during TUI operations
#[derive(Debug, Error)]
pub enum TuiError {
    /// IO error during terminal operations
    #[error("Terminal IO error: {0}")]
    Io(#[from] io::Error),
}

/// Display settings resolved from config and CLI.
#[derive(Debug, Clone, Copy)]
pub struct ViewSettings {
    /// Rows from the top at which the next older page is requested.
    pub top_threshold: usize,
    pub colors: ColorConfig,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            top_threshold: DEFAULT_TOP_THRESHOLD,
            colors: ColorConfig::from_env_and_args(false),
        }
    }
}

/// Main TUI application
///
/// Generic over backend to support testing with TestBackend
pub struct TuiApp<B>
where
    B: Backend,
{
    terminal: Terminal<B>,
    session: ConversationSession,
    viewport: ThreadViewport,
    composer: Composer,
    /// Latest notice, shown in the status line until replaced.
    notice: Option<Notice>,
    styles: ThreadStyles,
    settings: ViewSettings,
}

impl TuiApp<CrosstermBackend<Stdout>> {
    /// Create and initialize a new TUI application
    ///
    /// Sets up terminal in raw mode with alternate screen
    pub fn new(session: ConversationSession, settings: ViewSettings) -> Result<Self, TuiError> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        stdout.execute(EnterAlternateScreen)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Self::with_terminal(terminal, session, settings)
    }

    /// Run the main event loop
    ///
    /// Returns when the user quits (Esc or Ctrl+C).
    pub fn run(&mut self) -> Result<(), TuiError> {
        self.draw()?;

        loop {
            let mut dirty = false;
            if event::poll(POLL_INTERVAL)? {
                match event::read()? {
                    Event::Key(key) => {
                        if self.handle_key(key) {
                            return Ok(());
                        }
                        dirty = true;
                    }
                    Event::Resize(width, height) => {
                        self.handle_resize(width, height);
                        dirty = true;
                    }
                    _ => {}
                }
            }

            if self.pump() {
                dirty = true;
            }
            if dirty {
                self.draw()?;
            }
        }
    }
}

impl<B> TuiApp<B>
where
    B: Backend,
{
    /// Build the app around an existing terminal.
    pub fn with_terminal(
        terminal: Terminal<B>,
        session: ConversationSession,
        settings: ViewSettings,
    ) -> Result<Self, TuiError> {
        let size = terminal.size()?;
        let mut viewport = ThreadViewport::new(thread_dimensions(size.width, size.height));
        viewport.relayout(session.state().messages());

        Ok(Self {
            terminal,
            session,
            viewport,
            composer: Composer::new(),
            notice: None,
            styles: ThreadStyles::with_color_config(settings.colors),
            settings,
        })
    }

    pub fn session(&self) -> &ConversationSession {
        &self.session
    }

    pub fn viewport(&self) -> &ThreadViewport {
        &self.viewport
    }

    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }

    /// Apply waiting session updates, then request an older page if the
    /// reader is near the top. Returns whether anything changed.
    pub fn pump(&mut self) -> bool {
        let mut dirty = false;
        for _ in 0..MAX_UPDATES_PER_TICK {
            let anchor = self.viewport.capture_anchor();
            let Some(update) = self.session.pump_one() else {
                break;
            };
            self.apply_update(anchor, update);
            dirty = true;
        }

        if self.viewport.is_near_top(self.settings.top_threshold) && self.session.load_older() {
            debug!(offset = self.viewport.offset().get(), "Requested older page");
            dirty = true;
        }
        dirty
    }

    /// Reflect one update in the viewport.
    ///
    /// Restoring the anchor runs after every prepend; the jump to the newest
    /// message, when requested, is applied after the restore.
    pub fn apply_update(&mut self, anchor: ScrollAnchor, update: SyncUpdate) {
        if update.changed {
            self.viewport.relayout(self.session.state().messages());
        }
        if update.prepended > 0 {
            self.viewport.restore(anchor);
        }
        if update.scroll_to_bottom {
            self.viewport.scroll_to_bottom();
        }
        if let Some(notice) = update.notice {
            info!(level = ?notice.level(), text = notice.text(), "Notice");
            self.notice = Some(notice);
        }
    }

    /// Handle a single keyboard event.
    ///
    /// Returns true if the app should quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.kind != KeyEventKind::Press {
            return false;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc => return true,
            KeyCode::Char('c') if ctrl => return true,
            KeyCode::Char('r') if ctrl => {
                let anchor = self.viewport.capture_anchor();
                match self.session.retry_last_failed() {
                    Some(update) => self.apply_update(anchor, update),
                    None => debug!("Nothing to retry"),
                }
            }
            KeyCode::Enter => self.submit(),
            KeyCode::Backspace => self.composer.backspace(),
            KeyCode::Char(ch) if !ctrl => self.composer.insert(ch),
            KeyCode::Up => self.viewport.scroll_by(-1),
            KeyCode::Down => self.viewport.scroll_by(1),
            KeyCode::PageUp => self.viewport.scroll_by(-self.viewport.page_rows()),
            KeyCode::PageDown => self.viewport.scroll_by(self.viewport.page_rows()),
            KeyCode::Home => self.viewport.scroll_to_top(),
            KeyCode::End => self.viewport.scroll_to_bottom(),
            _ => {}
        }
        false
    }

    /// Send the composed text. The composer is cleared either way.
    fn submit(&mut self) {
        let text = self.composer.take();
        let anchor = self.viewport.capture_anchor();
        if let Some(update) = self.session.send(&text) {
            self.notice = None;
            self.apply_update(anchor, update);
        }
    }

    pub fn handle_resize(&mut self, width: u16, height: u16) {
        debug!("Handling resize to {}x{}", width, height);
        self.viewport
            .resize(thread_dimensions(width, height), self.session.state().messages());
    }

    /// Render the current frame
    pub fn draw(&mut self) -> Result<(), TuiError> {
        let size = self.terminal.size()?;
        let dimensions = thread_dimensions(size.width, size.height);
        if dimensions != self.viewport.dimensions() {
            self.viewport
                .resize(dimensions, self.session.state().messages());
        }

        let Self {
            terminal,
            session,
            viewport,
            composer,
            notice,
            styles,
            settings,
        } = self;
        let colors = settings.colors.colors_enabled();

        terminal.draw(|frame| {
            let [thread_area, status_area, composer_area] = Layout::vertical([
                Constraint::Min(1),
                Constraint::Length(STATUS_BAR_HEIGHT),
                Constraint::Length(COMPOSER_HEIGHT),
            ])
            .areas(frame.area());

            let state = session.state();
            frame.render_widget(ThreadView::new(state.messages(), viewport, *styles), thread_area);
            frame.render_widget(
                StatusLine::new(state, session.is_live(), notice.as_ref(), *styles, colors),
                status_area,
            );
            frame.render_widget(ComposerView::new(composer), composer_area);
        })?;

        Ok(())
    }
}

/// Thread area for a terminal of the given size.
fn thread_dimensions(width: u16, height: u16) -> ViewportDimensions {
    // Guard against zero width from the backend.
    let width = if width > 0 { width } else { FALLBACK_WIDTH };
    ViewportDimensions::new(
        width,
        height.saturating_sub(STATUS_BAR_HEIGHT + COMPOSER_HEIGHT),
    )
}

/// Initialize and run the TUI for an opened session.
///
/// `opened` is the update returned when the session was opened; its notice,
/// if any, is shown immediately. Logging must be initialized by the caller.
pub fn run_with_session(
    session: ConversationSession,
    opened: SyncUpdate,
    settings: ViewSettings,
) -> Result<(), TuiError> {
    let mut app = TuiApp::new(session, settings)?;
    let anchor = app.viewport.capture_anchor();
    app.apply_update(anchor, opened);

    // Run the app and ensure cleanup happens even on error
    let result = app.run();

    // Always restore terminal state
    restore_terminal()?;

    result
}

/// Restore terminal to normal state
///
/// Disables raw mode and leaves alternate screen
fn restore_terminal() -> Result<(), TuiError> {
    disable_raw_mode()?;
    io::stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

#[cfg(test)]
#[path = "tui_tests.rs"]
mod tests;
