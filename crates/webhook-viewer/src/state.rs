use crate::poller::PollOutcome;
use chrono::{DateTime, Local};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::{info, warn};
use webhook_core::ViewSnapshot;

pub struct App {
    source_label: String,
    snapshot: ViewSnapshot,
    last_success: Option<DateTime<Local>>,
    successful_polls: u64,
    failed_polls: u64,
    pub scroll: u16,
    pub help_open: bool,
    refresh_requested: bool,
    should_quit: bool,
}

impl App {
    pub fn new(source_label: impl Into<String>) -> Self {
        Self {
            source_label: source_label.into(),
            snapshot: ViewSnapshot::empty(),
            last_success: None,
            successful_polls: 0,
            failed_polls: 0,
            scroll: 0,
            help_open: false,
            refresh_requested: false,
            should_quit: false,
        }
    }

    pub fn source_label(&self) -> &str {
        &self.source_label
    }

    pub fn snapshot(&self) -> &ViewSnapshot {
        &self.snapshot
    }

    pub fn last_success(&self) -> Option<DateTime<Local>> {
        self.last_success
    }

    pub fn successful_polls(&self) -> u64 {
        self.successful_polls
    }

    pub fn apply_poll(&mut self, outcome: PollOutcome) {
        self.apply_poll_at(outcome, Local::now());
    }

    /// Success replaces the snapshot wholesale; failure only logs, leaving the
    /// last good snapshot on screen.
    pub fn apply_poll_at(&mut self, outcome: PollOutcome, at: DateTime<Local>) {
        match outcome {
            Ok(feed) => {
                self.snapshot.replace(feed);
                self.last_success = Some(at);
                self.successful_polls += 1;
                info!(
                    event = "poll_ok",
                    events = self.snapshot.len(),
                    total = self.snapshot.stats().total.unwrap_or(0)
                );
            }
            Err(err) => {
                self.failed_polls += 1;
                warn!(
                    event = "poll_failed",
                    kind = err.kind(),
                    error = %err,
                    failed_polls = self.failed_polls
                );
            }
        }
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) if matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) => {
                self.handle_key(key)
            }
            _ => {}
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }
        if matches!(key.code, KeyCode::Char('?') | KeyCode::F(1)) {
            self.help_open = !self.help_open;
            return;
        }
        if self.help_open {
            if key.code == KeyCode::Esc {
                self.help_open = false;
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Down | KeyCode::Char('j') => self.scroll = self.scroll.saturating_add(1),
            KeyCode::Up | KeyCode::Char('k') => self.scroll = self.scroll.saturating_sub(1),
            KeyCode::PageDown => self.scroll = self.scroll.saturating_add(10),
            KeyCode::PageUp => self.scroll = self.scroll.saturating_sub(10),
            KeyCode::Char('g') | KeyCode::Home => self.scroll = 0,
            KeyCode::Char('r') => self.refresh_requested = true,
            _ => {}
        }
    }

    /// Returns whether a manual refresh was asked for since the last call.
    pub fn take_refresh_request(&mut self) -> bool {
        std::mem::take(&mut self.refresh_requested)
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }
}
