//! End-to-end auth flows against in-memory collaborators.
//!
//! Every test runs on Tokio's paused clock, so the simulated sign-in and
//! sign-up latency resolves instantly once the test is otherwise idle.

use std::path::PathBuf;
use std::sync::Arc;

use waterwise_auth::{
    AuthConfig, AuthError, AuthServices, AuthSessionManager, AuthState, Directory, ManualClock,
    RecordingNavigator, UserDirectory,
};
use waterwise_notify::NotificationStore;
use waterwise_protocol::{Codec, JsonCodec, SessionRecord, UserId, UserRole, Variant};
use waterwise_storage::{KeyValueStorage, MemoryStorage, StorageError};

const NOW: u64 = 1_700_000_000_000;
const KEY: &str = "waterwise_session";

// =========================================================================
// Helpers
// =========================================================================

struct App {
    manager: AuthSessionManager,
    directory: Arc<UserDirectory>,
    storage: MemoryStorage,
    navigator: RecordingNavigator,
    notifications: NotificationStore,
    clock: ManualClock,
}

impl App {
    fn new() -> Self {
        Self::on(MemoryStorage::new(), Arc::new(UserDirectory::builtin()))
    }

    /// Starts a fresh manager over existing storage and directory, as a
    /// page reload would.
    fn on(storage: MemoryStorage, directory: Arc<UserDirectory>) -> Self {
        let navigator = RecordingNavigator::new();
        let notifications = NotificationStore::new();
        let clock = ManualClock::at(NOW);
        let manager = AuthSessionManager::new(
            AuthServices {
                directory: directory.clone(),
                storage: Arc::new(storage.clone()),
                notifications: notifications.clone(),
                navigator: Arc::new(navigator.clone()),
                clock: Arc::new(clock.clone()),
            },
            AuthConfig::default(),
        );
        Self {
            manager,
            directory,
            storage,
            navigator,
            notifications,
            clock,
        }
    }

    fn persisted(&self) -> Option<SessionRecord> {
        let raw = self.storage.get_item(KEY).unwrap()?;
        Some(JsonCodec.decode(raw.as_bytes()).unwrap())
    }

    fn variants(&self) -> Vec<Variant> {
        self.notifications
            .notifications()
            .into_iter()
            .map(|n| n.variant)
            .collect()
    }
}

// =========================================================================
// Sign-in
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_sign_in_every_directory_email_persists_session() {
    for (email, id, role) in [
        ("consumer@example.com", "1", UserRole::Consumer),
        ("company@example.com", "2", UserRole::Company),
        ("government@example.com", "3", UserRole::Government),
    ] {
        let app = App::new();

        let user = app.manager.sign_in(email, "any password").await.unwrap();

        assert_eq!(user.id.as_str(), id);
        assert_eq!(app.manager.state(), AuthState::Authenticated(user));
        let record = app.persisted().expect("session persisted");
        assert_eq!(record.user_id, UserId::from(id));
        assert_eq!(record.expires_at, NOW + AuthConfig::default().session_ttl_ms);
        assert_eq!(app.navigator.current(), Some(role.home_path()));
    }
}

#[tokio::test(start_paused = true)]
async fn test_sign_in_consumer_scenario() {
    let app = App::new();

    let user = app.manager.sign_in("consumer@example.com", "x").await.unwrap();

    assert_eq!(user.role, Some(UserRole::Consumer));
    assert_eq!(app.navigator.history(), ["/consumer"]);
    assert_eq!(app.variants(), [Variant::Success]);
}

#[tokio::test(start_paused = true)]
async fn test_sign_in_unknown_email_scenario() {
    let app = App::new();

    let err = app.manager.sign_in("nobody@example.com", "x").await.unwrap_err();

    assert!(matches!(err, AuthError::UnknownEmail(_)));
    assert_eq!(app.manager.state(), AuthState::Unauthenticated);
    assert_eq!(app.variants(), [Variant::Error]);
    assert_eq!(app.persisted(), None);
    assert!(app.navigator.history().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_sign_in_unknown_email_keeps_existing_session() {
    let app = App::new();
    let user = app.manager.sign_in("company@example.com", "").await.unwrap();
    let before = app.persisted();

    app.manager.sign_in("typo@example.com", "").await.unwrap_err();

    assert_eq!(app.manager.current_user(), Some(user));
    assert_eq!(app.persisted(), before);
}

#[tokio::test(start_paused = true)]
async fn test_subscribe_state_sees_authenticating_then_authenticated() {
    let app = App::new();
    let mut rx = app.manager.subscribe_state();

    let sign_in = app.manager.sign_in("government@example.com", "");
    tokio::pin!(sign_in);

    tokio::select! {
        _ = &mut sign_in => panic!("sign-in resolved before its latency"),
        changed = rx.changed() => changed.unwrap(),
    }
    assert_eq!(*rx.borrow_and_update(), AuthState::Authenticating);

    sign_in.await.unwrap();
    rx.changed().await.unwrap();
    assert!(rx.borrow().is_authenticated());
}

// =========================================================================
// Sign-up
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_sign_up_creates_fresh_user() {
    let app = App::new();

    let user = app
        .manager
        .sign_up("new@example.com", "longenough", "New User", Some(UserRole::Company))
        .await
        .unwrap();

    for taken in ["1", "2", "3"] {
        assert_ne!(user.id.as_str(), taken);
    }
    assert_eq!(user.id.as_str(), NOW.to_string());
    assert_eq!(user.name, "New User");
    assert_eq!(app.manager.current_user(), Some(user.clone()));
    assert_eq!(app.persisted().unwrap().user_id, user.id);
    assert_eq!(app.navigator.history(), ["/company"]);
    assert_eq!(app.variants(), [Variant::Success]);
}

#[tokio::test(start_paused = true)]
async fn test_sign_up_ids_stay_distinct_across_calls() {
    let app = App::new();
    let mut ids = Vec::new();

    for i in 0..5 {
        let user = app
            .manager
            .sign_up(&format!("u{i}@example.com"), "", "U", None)
            .await
            .unwrap();
        ids.push(user.id);
        if i % 2 == 0 {
            app.clock.advance(1);
        }
    }

    let mut unique = ids.clone();
    unique.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    unique.dedup();
    assert_eq!(unique.len(), ids.len());
}

#[tokio::test(start_paused = true)]
async fn test_sign_up_allows_duplicate_email() {
    let app = App::new();

    let user = app
        .manager
        .sign_up("consumer@example.com", "", "Copycat", None)
        .await
        .unwrap();

    assert_ne!(user.id.as_str(), "1");
    assert!(app.manager.is_authenticated());
}

#[tokio::test(start_paused = true)]
async fn test_signed_up_email_cannot_sign_in_again() {
    let app = App::new();
    app.manager
        .sign_up("fresh@example.com", "", "Fresh", Some(UserRole::Consumer))
        .await
        .unwrap();
    app.manager.sign_out();

    let err = app.manager.sign_in("fresh@example.com", "x").await.unwrap_err();

    assert!(matches!(err, AuthError::UnknownEmail(_)));
    assert_eq!(app.manager.state(), AuthState::Unauthenticated);
    assert_eq!(app.persisted(), None);
    assert_eq!(app.directory.len(), 3, "directory is never extended");
}

// =========================================================================
// Sign-out
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_sign_out_clears_session_idempotently() {
    let app = App::new();
    app.manager.sign_in("consumer@example.com", "").await.unwrap();

    app.manager.sign_out();
    app.manager.sign_out();

    assert_eq!(app.manager.state(), AuthState::Unauthenticated);
    assert_eq!(app.persisted(), None);
    assert_eq!(app.navigator.history(), ["/consumer", "/", "/"]);
    assert_eq!(
        app.variants(),
        [Variant::Success, Variant::Info, Variant::Info]
    );
}

#[tokio::test(start_paused = true)]
async fn test_sign_out_when_never_signed_in() {
    let app = App::new();
    app.manager.sign_out();
    assert!(!app.manager.is_authenticated());
    assert_eq!(app.navigator.current().as_deref(), Some("/"));
}

// =========================================================================
// Restore
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_restore_after_reload() {
    let first = App::new();
    first.manager.sign_in("company@example.com", "").await.unwrap();

    let reloaded = App::on(first.storage.clone(), first.directory.clone());

    assert_eq!(reloaded.manager.current_user().unwrap().id.as_str(), "2");
    assert!(reloaded.notifications.is_empty(), "restore is silent");
    assert!(reloaded.navigator.history().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_restore_does_not_resolve_signed_up_user() {
    let first = App::new();
    let created = first
        .manager
        .sign_up("x@example.com", "", "X", None)
        .await
        .unwrap();
    assert_eq!(first.persisted().unwrap().user_id, created.id);

    // The record names an id the directory doesn't know.
    let reloaded = App::on(first.storage.clone(), first.directory.clone());

    assert_eq!(reloaded.manager.state(), AuthState::Unauthenticated);
    assert!(reloaded.notifications.is_empty());
}

#[test]
fn test_restore_ignores_corrupt_record() {
    let storage = MemoryStorage::new();
    storage.set_item(KEY, "][").unwrap();

    let app = App::on(storage, Arc::new(UserDirectory::builtin()));

    assert_eq!(app.manager.state(), AuthState::Unauthenticated);
    assert!(app.notifications.is_empty());
}

#[test]
fn test_restore_keeps_expired_record_by_default() {
    let storage = MemoryStorage::new();
    storage
        .set_item(KEY, r#"{"userId":"3","expiresAt":0}"#)
        .unwrap();

    let app = App::on(storage, Arc::new(UserDirectory::builtin()));

    assert_eq!(
        app.manager.current_user().map(|u| u.id),
        Some(UserId::from("3"))
    );
}

#[test]
fn test_directory_lookup_through_trait_object() {
    let directory: Arc<dyn Directory> = Arc::new(UserDirectory::builtin());
    assert!(directory.find_by_email("government@example.com").is_some());
}

// =========================================================================
// Storage failures
// =========================================================================

/// Storage that reads as empty and refuses every write.
struct ReadOnlyStorage;

impl KeyValueStorage for ReadOnlyStorage {
    fn get_item(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Ok(None)
    }

    fn set_item(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::WriteFailed {
            path: PathBuf::from("/read-only"),
            source: std::io::Error::other("read-only"),
        })
    }

    fn remove_item(&self, _key: &str) -> Result<(), StorageError> {
        Ok(())
    }
}

#[tokio::test(start_paused = true)]
async fn test_sign_in_storage_failure_restores_state() {
    let notifications = NotificationStore::new();
    let navigator = RecordingNavigator::new();
    let manager = AuthSessionManager::new(
        AuthServices {
            directory: Arc::new(UserDirectory::builtin()),
            storage: Arc::new(ReadOnlyStorage),
            notifications: notifications.clone(),
            navigator: Arc::new(navigator.clone()),
            clock: Arc::new(ManualClock::at(NOW)),
        },
        AuthConfig::default(),
    );

    let err = manager.sign_in("consumer@example.com", "").await.unwrap_err();

    assert!(matches!(err, AuthError::Storage(_)));
    assert_eq!(manager.state(), AuthState::Unauthenticated);
    assert!(navigator.history().is_empty());
    let shown = notifications.notifications();
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].variant, Variant::Error);

    // Sign-up fails the same way.
    let err = manager.sign_up("n@example.com", "", "N", None).await.unwrap_err();
    assert!(matches!(err, AuthError::Storage(_)));
    assert!(!manager.is_loading());
}
