//! Persistence for the single session record.

use std::sync::Arc;

use tracing::{debug, warn};
use waterwise_protocol::{Codec, JsonCodec, ProtocolError, SessionRecord};
use waterwise_storage::KeyValueStorage;

use crate::AuthError;

/// Reads and writes the at-most-one [`SessionRecord`] under a fixed key.
///
/// Generic over the codec like the rest of the stack, with JSON as the
/// default since the persisted layout is `{"userId", "expiresAt"}`.
pub struct SessionStore<C: Codec = JsonCodec> {
    storage: Arc<dyn KeyValueStorage>,
    key: String,
    codec: C,
}

impl SessionStore {
    /// A JSON-encoded store writing to `key`.
    pub fn new(storage: Arc<dyn KeyValueStorage>, key: impl Into<String>) -> Self {
        Self::with_codec(storage, key, JsonCodec)
    }
}

impl<C: Codec> SessionStore<C> {
    pub fn with_codec(storage: Arc<dyn KeyValueStorage>, key: impl Into<String>, codec: C) -> Self {
        Self {
            storage,
            key: key.into(),
            codec,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the stored record.
    ///
    /// Absent, unreadable, or malformed data all read as `None`; the last
    /// two are logged and otherwise ignored.
    pub fn load(&self) -> Option<SessionRecord> {
        let raw = match self.storage.get_item(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(key = %self.key, error = %e, "failed to read session");
                return None;
            }
        };

        match self.codec.decode(raw.as_bytes()) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(key = %self.key, error = %e, "ignoring corrupt session");
                None
            }
        }
    }

    /// Replaces the stored record.
    pub fn save(&self, record: &SessionRecord) -> Result<(), AuthError> {
        let bytes = self.codec.encode(record)?;
        let text = String::from_utf8(bytes)
            .map_err(|e| ProtocolError::InvalidValue(format!("session is not UTF-8: {e}")))?;
        self.storage.set_item(&self.key, &text)?;
        debug!(user_id = %record.user_id, expires_at = record.expires_at, "session saved");
        Ok(())
    }

    /// Removes the stored record. Clearing an absent record is fine.
    pub fn clear(&self) -> Result<(), AuthError> {
        self.storage.remove_item(&self.key)?;
        debug!(key = %self.key, "session cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use waterwise_protocol::UserId;
    use waterwise_storage::MemoryStorage;

    use super::*;

    fn store() -> (SessionStore, MemoryStorage) {
        let storage = MemoryStorage::new();
        (
            SessionStore::new(Arc::new(storage.clone()), "waterwise_session"),
            storage,
        )
    }

    #[test]
    fn test_load_empty_is_none() {
        let (sessions, _) = store();
        assert_eq!(sessions.load(), None);
    }

    #[test]
    fn test_save_writes_camel_case_layout() {
        let (sessions, storage) = store();
        sessions
            .save(&SessionRecord::new(UserId::from("1"), 1_700_000_000_000))
            .unwrap();

        let raw = storage.get_item("waterwise_session").unwrap().unwrap();
        assert_eq!(raw, r#"{"userId":"1","expiresAt":1700000000000}"#);
    }

    #[test]
    fn test_save_then_load_returns_record() {
        let (sessions, _) = store();
        let record = SessionRecord::new(UserId::from("2"), 42);
        sessions.save(&record).unwrap();
        assert_eq!(sessions.load(), Some(record));
    }

    #[test]
    fn test_load_corrupt_is_none() {
        let (sessions, storage) = store();
        storage.set_item("waterwise_session", "{not json").unwrap();
        assert_eq!(sessions.load(), None);

        storage
            .set_item("waterwise_session", r#"{"userId":"1"}"#)
            .unwrap();
        assert_eq!(sessions.load(), None, "missing expiresAt");
    }

    #[test]
    fn test_clear_removes_record_and_is_idempotent() {
        let (sessions, storage) = store();
        sessions
            .save(&SessionRecord::new(UserId::from("3"), 1))
            .unwrap();

        sessions.clear().unwrap();
        sessions.clear().unwrap();

        assert!(storage.is_empty());
        assert_eq!(sessions.load(), None);
    }
}
