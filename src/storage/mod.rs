//! Key/bytes storage backends for persisted form snapshots

mod error;
mod file;
mod memory;
mod traits;

pub use error::StorageError;
pub use file::FileStorage;
pub use memory::MemoryStorage;
pub use traits::Storage;

#[cfg(test)]
pub use traits::MockStorage;
