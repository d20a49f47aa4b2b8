//! Durable Storage Module
//!
//! A small string key-value interface for persisted cache snapshots, with an
//! in-memory backend and a directory-backed one.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use thiserror::Error;

// == Storage Error ==
#[derive(Error, Debug)]
pub enum StorageError {
    /// The backend has no room for the write
    #[error("Storage quota exceeded writing '{0}'")]
    QuotaExceeded(String),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backend cannot be used right now
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Durable string storage shared by every cache in the process.
///
/// Values written by one handle are visible to every other handle on the
/// same backing store. Concurrent writers to one key are last-writer-wins.
pub trait DurableStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removing an absent key is not an error.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;

    fn keys(&self) -> Result<Vec<String>, StorageError>;
}
