//! Durable string-keyed storage used as the coordination medium

mod error;
mod memory;
mod sqlite;

use std::sync::Arc;

pub use error::{Result, StorageError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// A simple get/set/remove key/value port.
///
/// Implementations use interior mutability so one store can be shared by
/// every record type through a [`SharedStorage`] handle.
pub trait Storage: Send + Sync {
    /// Read the value stored under `key`
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value in one step
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`; removing an absent key is not an error
    fn remove(&self, key: &str) -> Result<()>;
}

/// Shared handle to a storage backend
pub type SharedStorage = Arc<dyn Storage>;
