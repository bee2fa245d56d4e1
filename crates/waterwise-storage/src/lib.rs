//! Durable key-value storage abstraction for WaterWise.
//!
//! Provides the [`KeyValueStorage`] trait, the same `getItem` / `setItem` /
//! `removeItem` surface a browser's local storage offers, plus two
//! implementations:
//!
//! - [`MemoryStorage`]: process-local, used by tests and headless runs
//! - [`FileStorage`]: a JSON file on disk, survives process restarts
//!
//! # Feature Flags
//!
//! - `file` (default): [`FileStorage`] via `serde_json`

mod error;
#[cfg(feature = "file")]
mod file;

pub use error::StorageError;
#[cfg(feature = "file")]
pub use file::FileStorage;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// A string-keyed, string-valued durable store.
///
/// Implementations must be safe to share: the session store holds one
/// behind an `Arc<dyn KeyValueStorage>`.
pub trait KeyValueStorage: Send + Sync + 'static {
    /// Returns the value stored under `key`, or `None` if absent.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes `key`. Removing an absent key is not an error.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// In-memory [`KeyValueStorage`].
///
/// Cloning yields another handle to the same map, so a test can keep one
/// clone for assertions while the code under test owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.items.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        items.insert(key.to_owned(), value.to_owned());
        tracing::trace!(key, "memory storage item set");
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        items.remove(key);
        tracing::trace!(key, "memory storage item removed");
        Ok(())
    }
}
