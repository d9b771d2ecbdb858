//! Trait abstraction for storage to enable mocking in tests

use super::StorageError;

/// Durable key/bytes store.
///
/// Callers never assume durability or capacity: every method may fail and
/// every call site degrades gracefully.
#[cfg_attr(test, mockall::automock)]
pub trait Storage {
    /// Read the bytes stored under `key`, `None` when absent
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Store `bytes` under `key`, replacing any previous value
    fn set(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError>;

    /// Remove `key`; removing an absent key succeeds
    fn delete(&self, key: &str) -> Result<(), StorageError>;
}

impl<T: Storage + ?Sized> Storage for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        (**self).set(key, bytes)
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        (**self).delete(key)
    }
}
