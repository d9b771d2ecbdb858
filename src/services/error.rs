//! Errors from external collaborators

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A clipboard or export operation that did not complete
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("clipboard unavailable: {0}")]
    Clipboard(String),

    #[error("failed to write {}: {source}", path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("image encode failed: {0}")]
    Image(String),

    #[error("background task failed: {0}")]
    Task(String),
}

impl From<image::ImageError> for ServiceError {
    fn from(err: image::ImageError) -> Self {
        ServiceError::Image(err.to_string())
    }
}

impl From<qrcode::types::QrError> for ServiceError {
    fn from(err: qrcode::types::QrError) -> Self {
        ServiceError::Image(err.to_string())
    }
}

impl From<arboard::Error> for ServiceError {
    fn from(err: arboard::Error) -> Self {
        ServiceError::Clipboard(err.to_string())
    }
}

impl From<tokio::task::JoinError> for ServiceError {
    fn from(err: tokio::task::JoinError) -> Self {
        ServiceError::Task(err.to_string())
    }
}
