//! File-backed storage: one JSON object mapping keys to string values.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::{KeyValueStorage, StorageError};

type Items = BTreeMap<String, String>;

/// A [`KeyValueStorage`] persisted to a single JSON file.
///
/// Every write rewrites the whole file through a sibling temp file and a
/// rename, so a crash mid-write leaves either the old or the new content.
/// A missing file reads as an empty store.
pub struct FileStorage {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileStorage {
    /// Opens (without creating) storage at `path`.
    ///
    /// The file and its parent directory are created on first write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        tracing::debug!(path = %path.display(), "file storage opened");
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    /// The backing file's location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_items(&self) -> Result<Items, StorageError> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Items::new()),
            Err(source) => {
                return Err(StorageError::ReadFailed {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(Items::new());
        }
        serde_json::from_slice(&raw).map_err(|source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn write_items(&self, items: &Items) -> Result<(), StorageError> {
        let write_err = |source| StorageError::WriteFailed {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let body = serde_json::to_vec_pretty(items)
            .map_err(|e| write_err(std::io::Error::new(ErrorKind::InvalidData, e)))?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, body).map_err(write_err)?;
        fs::rename(&tmp, &self.path).map_err(write_err)
    }

    /// Runs a read-modify-write cycle under the in-process lock.
    ///
    /// A corrupt file is replaced: the cycle starts from an empty store and
    /// the write overwrites the unreadable content.
    fn update(&self, f: impl FnOnce(&mut Items)) -> Result<(), StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut items = match self.read_items() {
            Ok(items) => items,
            Err(StorageError::Corrupt { source, .. }) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %source,
                    "storage file is corrupt, overwriting"
                );
                Items::new()
            }
            Err(e) => return Err(e),
        };
        f(&mut items);
        self.write_items(&items)
    }
}

impl KeyValueStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.read_items()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.update(|items| {
            items.insert(key.to_owned(), value.to_owned());
        })?;
        tracing::trace!(key, path = %self.path.display(), "file storage item set");
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        // Skip the rewrite when there is nothing to remove and no file yet.
        if !self.path.exists() {
            return Ok(());
        }
        self.update(|items| {
            items.remove(key);
        })?;
        tracing::trace!(key, path = %self.path.display(), "file storage item removed");
        Ok(())
    }
}
