//! Application state and core logic

use crate::config::AppConfig;
use crate::services::{
    completion_channel, ClipboardService, Completion, CompletionReceiver, CompletionSender,
    SystemClipboard, TaskKind,
};
use crate::state::{
    Derived, Evaluation, FieldPath, FieldValue, Form, FormError, NoticeQueue, Notifier, Revision,
    Severity, ToolSession,
};
use crate::storage::{FileStorage, MemoryStorage, Storage};
use crate::tools::{password, ToolId, ToolSettings};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Second Ctrl+C within this window quits
const QUIT_WINDOW: Duration = Duration::from_secs(1);

/// Which pane receives key presses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Sidebar,
    Form,
}

/// Main application struct
pub struct App {
    /// One session per tool, in sidebar order
    sessions: Vec<ToolSession>,
    /// Index of the tool shown in the main panel
    selected: usize,
    pub focus: Focus,
    /// Status line notice and modal error queue
    pub notices: NoticeQueue,
    storage: Box<dyn Storage>,
    clipboard: Arc<dyn ClipboardService>,
    export_dir: PathBuf,
    completions_tx: CompletionSender,
    completions_rx: CompletionReceiver,
    /// Whether the app should quit
    quit: bool,
    /// Timestamp of last Ctrl+C press for double-tap quit
    pub last_ctrl_c: Option<Instant>,
}

impl App {
    /// Create the app with on-disk storage and the system clipboard
    pub fn new(config: &AppConfig) -> Result<Self> {
        let storage: Box<dyn Storage> = match config.storage_dir() {
            Some(dir) => Box::new(FileStorage::new(dir)),
            None => {
                tracing::warn!("no data directory available, saved data will not survive a restart");
                Box::new(MemoryStorage::new())
            }
        };
        Self::with_services(
            &config.tool_settings(),
            config.default_tool(),
            storage,
            Arc::new(SystemClipboard),
            config.export_dir(),
        )
    }

    /// Create the app around explicit collaborators
    pub fn with_services(
        settings: &ToolSettings,
        default_tool: ToolId,
        storage: Box<dyn Storage>,
        clipboard: Arc<dyn ClipboardService>,
        export_dir: PathBuf,
    ) -> Result<Self> {
        let (completions_tx, completions_rx) = completion_channel();
        let mut notices = NoticeQueue::new();
        let now = Instant::now();

        let mut sessions = Vec::with_capacity(ToolId::ALL.len());
        for tool in ToolId::ALL {
            let mut session = ToolSession::new(tool, tool.build(settings)?);
            if let Err(err) = session.initialize(storage.as_ref()) {
                notices.notify(
                    format!("Could not load saved {} data: {err}", tool.label()),
                    Severity::Error,
                );
            }
            // Restored inputs get their result straight away
            if session.form().is_saved() {
                session.form_mut().recompute(now, storage.as_ref());
            }
            sessions.push(session);
        }

        let selected = ToolId::ALL
            .iter()
            .position(|tool| *tool == default_tool)
            .unwrap_or(0);
        tracing::info!(tool = default_tool.slug(), "app started");

        Ok(Self {
            sessions,
            selected,
            focus: Focus::default(),
            notices,
            storage,
            clipboard,
            export_dir,
            completions_tx,
            completions_rx,
            quit: false,
            last_ctrl_c: None,
        })
    }

    /// Check if app should quit
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn sessions(&self) -> &[ToolSession] {
        &self.sessions
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn current(&self) -> &ToolSession {
        &self.sessions[self.selected]
    }

    /// Ctrl+C: the first press arms, a second one within the window quits
    pub fn handle_ctrl_c(&mut self, now: Instant) {
        match self.last_ctrl_c {
            Some(previous) if now.duration_since(previous) <= QUIT_WINDOW => self.quit = true,
            _ => {
                self.last_ctrl_c = Some(now);
                self.notices
                    .notify("Press Ctrl+C again to quit".to_string(), Severity::Info);
            }
        }
    }

    /// Handle a key event
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        self.handle_key_at(key, Instant::now())
    }

    pub fn handle_key_at(&mut self, key: KeyEvent, now: Instant) -> Result<()> {
        // Handle error dialog dismissal first (modal)
        if self.notices.has_errors() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                self.notices.dismiss_error();
            }
            return Ok(());
        }

        match self.focus {
            Focus::Sidebar => self.handle_sidebar_key(key),
            Focus::Form => self.handle_form_key(key, now),
        }
        Ok(())
    }

    fn handle_sidebar_key(&mut self, key: KeyEvent) {
        let count = self.sessions.len();
        let before = self.selected;
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.selected = (self.selected + 1) % count;
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.selected = (self.selected + count - 1) % count;
            }
            KeyCode::Char(c @ '0'..='9') => {
                // '0' is the tenth tool
                let index = (c as usize + 9 - '0' as usize) % 10;
                if index < count {
                    self.selected = index;
                }
            }
            KeyCode::Enter | KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => {
                self.focus = Focus::Form;
            }
            _ => {}
        }
        // Notices belong to the tool that raised them
        if self.selected != before {
            self.notices.clear_status();
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent, now: Instant) {
        let shortcut = key.modifiers.contains(crate::platform::COPY_MODIFIER);
        let result = match key.code {
            KeyCode::Esc => {
                self.focus = Focus::Sidebar;
                Ok(())
            }
            KeyCode::Tab | KeyCode::Down => {
                self.session_mut().next_field();
                Ok(())
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.session_mut().prev_field();
                Ok(())
            }
            KeyCode::Char('y') if shortcut => {
                self.copy_result();
                Ok(())
            }
            KeyCode::Char('r') if shortcut => {
                self.reset_current();
                Ok(())
            }
            KeyCode::Char('g') if shortcut => {
                self.generate(now);
                Ok(())
            }
            KeyCode::Char('e') if shortcut => {
                self.export_current();
                Ok(())
            }
            KeyCode::Char('d') if shortcut => self.remove_row(now),
            KeyCode::Left => self.session_mut().cycle(false, now),
            KeyCode::Right => self.session_mut().cycle(true, now),
            KeyCode::Char(' ') if !self.current().is_typing_target() => {
                self.session_mut().cycle(true, now)
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.session_mut().input_char(c, now)
            }
            KeyCode::Backspace => self.session_mut().backspace(now),
            KeyCode::Enter => self.session_mut().activate(now).map(|_| ()),
            _ => Ok(()),
        };

        match result {
            // shown inline next to the field
            Ok(()) | Err(FormError::Rejected { .. }) => {}
            Err(err) => self.notices.notify(err.to_string(), Severity::Error),
        }
    }

    /// Advance timers and apply finished background work
    pub fn tick(&mut self, now: Instant) {
        for index in 0..self.sessions.len() {
            let was_finished = self.sessions[index]
                .form()
                .last_outcome()
                .derived()
                .is_some_and(Derived::is_finished);
            let evaluation = self.sessions[index]
                .form_mut()
                .poll(now, self.storage.as_ref());
            if let Some(evaluation) = evaluation {
                self.report(self.sessions[index].tool(), evaluation, was_finished);
            }
        }

        while let Ok(completion) = self.completions_rx.try_recv() {
            self.apply_completion(completion);
        }
        self.notices.expire(now);
    }

    fn report(&mut self, tool: ToolId, evaluation: Evaluation, was_finished: bool) {
        if let Some(err) = evaluation.storage_error {
            self.notices.notify(
                format!("Could not save {} data: {err}", tool.label()),
                Severity::Error,
            );
        }
        if let Some(derived) = evaluation.outcome.derived() {
            if derived.is_finished() && !was_finished {
                if let Some((headline, detail)) = derived.headline_pair() {
                    self.notices
                        .notify(format!("{headline} {detail}"), Severity::Info);
                }
            }
        }
    }

    /// Apply a background result unless the form changed since it was issued
    pub fn apply_completion(&mut self, completion: Completion) {
        let Some(session) = self.sessions.iter().find(|s| s.tool() == completion.tool) else {
            return;
        };
        if !session.form().is_current(completion.revision) {
            tracing::debug!(
                tool = completion.tool.slug(),
                kind = ?completion.kind,
                "dropping stale completion"
            );
            return;
        }
        match completion.result {
            Ok(message) => self.notices.notify(message, Severity::Success),
            Err(err) => {
                let action = match completion.kind {
                    TaskKind::Copy => "copy",
                    TaskKind::Export => "export",
                };
                self.notices
                    .notify(format!("Failed to {action}: {err}"), Severity::Error);
            }
        }
    }

    fn session_mut(&mut self) -> &mut ToolSession {
        &mut self.sessions[self.selected]
    }

    fn issued_at(&self) -> (ToolId, Revision) {
        let session = self.current();
        (session.tool(), session.form().revision())
    }

    fn copy_result(&mut self) {
        let session = self.current();
        let Some(text) = session.tool().copy_text(session.form()) else {
            self.notices
                .notify("Nothing to copy yet".to_string(), Severity::Error);
            return;
        };
        let (tool, revision) = self.issued_at();
        let clipboard = Arc::clone(&self.clipboard);
        let tx = self.completions_tx.clone();
        tokio::spawn(async move {
            let result = clipboard
                .copy(text)
                .await
                .map(|()| "Copied to clipboard".to_string());
            let _ = tx.send(Completion {
                tool,
                revision,
                kind: TaskKind::Copy,
                result,
            });
        });
    }

    fn export_current(&mut self) {
        let session = self.current();
        let job = match session.tool().export_job(session.form()) {
            None => return,
            Some(Err(reason)) => {
                self.notices.notify(reason.to_string(), Severity::Error);
                return;
            }
            Some(Ok(job)) => job,
        };
        let (tool, revision) = self.issued_at();
        let dir = self.export_dir.clone();
        let tx = self.completions_tx.clone();
        tokio::spawn(async move {
            let result = job.run(&dir).await;
            let _ = tx.send(Completion {
                tool,
                revision,
                kind: TaskKind::Export,
                result,
            });
        });
    }

    fn generate(&mut self, now: Instant) {
        if !self.current().tool().generates() {
            return;
        }
        let generated = password::generate(self.current().form().record(), &mut rand::rng());
        let password = match generated {
            Ok(password) => password,
            Err(err) => {
                self.notices.notify(err.reason, Severity::Error);
                return;
            }
        };

        let path = FieldPath::field("password");
        let storage = self.storage.as_ref();
        let session = &mut self.sessions[self.selected];
        if let Err(err) = session.set_value(&path, FieldValue::Text(password), now) {
            self.notices.notify(err.to_string(), Severity::Error);
            return;
        }
        session.form_mut().recompute(now, storage);
        self.notices
            .notify("Password generated".to_string(), Severity::Success);
    }

    fn reset_current(&mut self) {
        let storage = self.storage.as_ref();
        let session = &mut self.sessions[self.selected];
        let label = session.tool().label();
        match session.reset(storage) {
            Ok(()) => self
                .notices
                .notify(format!("{label} reset"), Severity::Success),
            Err(err) => self.notices.notify(
                format!("{label} reset, but saved data could not be removed: {err}"),
                Severity::Error,
            ),
        }
    }

    fn remove_row(&mut self, now: Instant) -> Result<(), FormError> {
        if !self.session_mut().remove_focused_row(now)? {
            self.notices
                .notify("Move to a row to remove it".to_string(), Severity::Info);
        }
        Ok(())
    }
}
