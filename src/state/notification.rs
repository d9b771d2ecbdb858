//! User-facing notices

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// How long an info or success notice stays in the status bar
pub const NOTICE_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Error,
}

/// Fire-and-forget sink for messages meant for the user
pub trait Notifier {
    fn notify(&mut self, message: String, severity: Severity);
}

/// Transient status line message
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub message: String,
    pub severity: Severity,
    pub shown_at: Instant,
}

/// Status-bar notice plus a queue of errors shown modally, one at a time
#[derive(Debug, Default)]
pub struct NoticeQueue {
    status: Option<Notice>,
    errors: VecDeque<String>,
}

impl NoticeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> Option<&Notice> {
        self.status.as_ref()
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    /// Drop the status notice once it has been visible long enough
    pub fn expire(&mut self, now: Instant) {
        if self
            .status
            .as_ref()
            .is_some_and(|n| now.duration_since(n.shown_at) >= NOTICE_TTL)
        {
            self.status = None;
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn current_error(&self) -> Option<&str> {
        self.errors.front().map(String::as_str)
    }

    /// Errors waiting behind the one on screen
    pub fn queued_errors(&self) -> usize {
        self.errors.len().saturating_sub(1)
    }

    pub fn dismiss_error(&mut self) {
        self.errors.pop_front();
    }

    fn push_status(&mut self, message: String, severity: Severity, now: Instant) {
        self.status = Some(Notice {
            message,
            severity,
            shown_at: now,
        });
    }
}

impl Notifier for NoticeQueue {
    fn notify(&mut self, message: String, severity: Severity) {
        match severity {
            Severity::Error => {
                tracing::warn!(%message, "error notice");
                self.errors.push_back(message);
            }
            Severity::Info | Severity::Success => {
                tracing::debug!(%message, ?severity, "notice");
                self.push_status(message, severity, Instant::now());
            }
        }
    }
}
