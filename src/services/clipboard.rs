//! Clipboard access

use async_trait::async_trait;

use super::ServiceError;

/// Trait for clipboard writes, enabling mocking in tests
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClipboardService: Send + Sync {
    /// Replace the clipboard contents with `text`
    async fn copy(&self, text: String) -> Result<(), ServiceError>;
}

/// System clipboard via arboard
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

#[async_trait]
impl ClipboardService for SystemClipboard {
    async fn copy(&self, text: String) -> Result<(), ServiceError> {
        // arboard talks to the display server synchronously
        tokio::task::spawn_blocking(move || -> Result<(), ServiceError> {
            let mut clipboard = arboard::Clipboard::new()?;
            clipboard.set_text(text)?;
            Ok(())
        })
        .await?
    }
}
