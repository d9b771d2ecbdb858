//! External collaborators: clipboard, file export and image encoding
//!
//! Both run off the UI loop and report back through a [`Completion`]
//! carrying the revision of the form that issued them.

mod clipboard;
mod error;
mod export;
mod imaging;

pub use clipboard::{ClipboardService, SystemClipboard};
pub use error::ServiceError;
pub use export::ExportJob;

#[cfg(test)]
pub use clipboard::MockClipboardService;

use tokio::sync::mpsc;

use crate::state::Revision;
use crate::tools::ToolId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Copy,
    Export,
}

/// Result of a background operation, tagged with where it came from
#[derive(Debug)]
pub struct Completion {
    pub tool: ToolId,
    pub revision: Revision,
    pub kind: TaskKind,
    /// Success message for the user
    pub result: Result<String, ServiceError>,
}

pub type CompletionSender = mpsc::UnboundedSender<Completion>;
pub type CompletionReceiver = mpsc::UnboundedReceiver<Completion>;

pub fn completion_channel() -> (CompletionSender, CompletionReceiver) {
    mpsc::unbounded_channel()
}
