//! Storage error type

use std::io;

use thiserror::Error;

/// Persistence read/write failure. Never fatal to the caller.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage IO error for '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to encode snapshot for '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl StorageError {
    pub fn io(key: &str, source: io::Error) -> Self {
        Self::Io {
            key: key.to_string(),
            source,
        }
    }
}
