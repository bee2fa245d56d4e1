//! The auth session manager: who is signed in right now.
//!
//! The manager owns the current [`AuthState`] and is the only writer of
//! the persisted session record. Every transition it makes is announced
//! twice: on the `watch` channel returned by
//! [`subscribe_state`](AuthSessionManager::subscribe_state), and to the
//! user through the shared [`NotificationStore`].
//!
//! # Sequencing
//!
//! Sign-in and sign-up share one in-flight gate. While either is waiting
//! out its simulated latency the state is `Authenticating`, and a second
//! call is turned away with [`AuthError::OperationInFlight`].
//!
//! Each gated operation also takes a ticket from a monotonically
//! increasing epoch. `sign_out` bumps the epoch too, so an operation that
//! finds the epoch moved when it wakes knows its result is stale and
//! drops it instead of signing the user back in.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;
use tokio::time;
use tracing::{debug, info, warn};
use waterwise_notify::NotificationStore;
use waterwise_protocol::{SessionRecord, UserId, UserProfile, UserRole};
use waterwise_storage::KeyValueStorage;

use crate::navigator::HOME_PATH;
use crate::{AuthConfig, AuthError, AuthState, Clock, Directory, Navigator, SessionStore};

/// Minimum password length the sign-up form asks for. Advisory only: the
/// manager never inspects passwords.
pub const SIGN_UP_PASSWORD_HINT_LEN: usize = 8;

const SIGN_IN_OK_TITLE: &str = "登入成功";
const SIGN_IN_OK_PREFIX: &str = "歡迎回來，";
const SIGN_IN_FAILED_TITLE: &str = "登入失敗";
const SIGN_IN_FAILED_MESSAGE: &str = "Email 或密碼錯誤";
const SIGN_UP_OK_TITLE: &str = "註冊成功";
const SIGN_UP_OK_MESSAGE: &str = "歡迎使用 WaterWise";
const SIGN_UP_FAILED_TITLE: &str = "註冊失敗";
const SIGNED_OUT_TITLE: &str = "已登出";
const SIGNED_OUT_MESSAGE: &str = "您已成功登出系統";
const TRY_AGAIN_MESSAGE: &str = "請稍後再試";

/// The collaborators an [`AuthSessionManager`] talks to.
pub struct AuthServices {
    pub directory: Arc<dyn Directory>,
    pub storage: Arc<dyn KeyValueStorage>,
    pub notifications: NotificationStore,
    pub navigator: Arc<dyn Navigator>,
    pub clock: Arc<dyn Clock>,
}

/// Drives sign-in, sign-up, sign-out, and restore-on-start.
///
/// ## Lifecycle
///
/// ```text
/// new() ──restore──→ Unauthenticated | Authenticated
///
/// sign_in()/sign_up() ──→ Authenticating ──latency──→ Authenticated
///                               │
///                               └──failure──→ previous state
///
/// sign_out() ──→ Unauthenticated (always)
/// ```
pub struct AuthSessionManager {
    directory: Arc<dyn Directory>,
    sessions: SessionStore,
    notifications: NotificationStore,
    navigator: Arc<dyn Navigator>,
    clock: Arc<dyn Clock>,
    config: AuthConfig,
    state: watch::Sender<AuthState>,
    epoch: AtomicU64,
    /// Ids handed out by sign-up. Kept apart from the directory, which
    /// sign-in and restore consult and which never changes.
    issued_ids: Mutex<HashSet<UserId>>,
}

impl AuthSessionManager {
    /// Creates the manager and restores any persisted session.
    ///
    /// Restoring is silent: no notification, no navigation. A missing,
    /// corrupt, unknown, or (with `enforce_session_expiry`) expired record
    /// leaves the manager `Unauthenticated`.
    pub fn new(services: AuthServices, config: AuthConfig) -> Self {
        let config = config.validated();
        let (state, _) = watch::channel(AuthState::Unauthenticated);
        let manager = Self {
            sessions: SessionStore::new(services.storage, config.storage_key.clone()),
            directory: services.directory,
            notifications: services.notifications,
            navigator: services.navigator,
            clock: services.clock,
            config,
            state,
            epoch: AtomicU64::new(0),
            issued_ids: Mutex::new(HashSet::new()),
        };
        manager.restore();
        manager
    }

    fn restore(&self) {
        let Some(record) = self.sessions.load() else {
            debug!("no session to restore");
            return;
        };

        if self.config.enforce_session_expiry && record.is_expired_at(self.clock.now_millis()) {
            info!(user_id = %record.user_id, expires_at = record.expires_at, "discarding expired session");
            if let Err(e) = self.sessions.clear() {
                warn!(error = %e, "failed to clear expired session");
            }
            return;
        }

        match self.directory.find_by_id(&record.user_id) {
            Some(user) => {
                info!(user_id = %user.id, role = ?user.role, "session restored");
                self.state.send_replace(AuthState::Authenticated(user));
            }
            None => debug!(user_id = %record.user_id, "session names an unknown user"),
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// A snapshot of the current state.
    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    /// A receiver that sees every state change from now on.
    pub fn subscribe_state(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn current_user(&self) -> Option<UserProfile> {
        self.state.borrow().user().cloned()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading()
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// The store this manager reports to.
    pub fn notifications(&self) -> &NotificationStore {
        &self.notifications
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    /// Signs in as the directory user with this email.
    ///
    /// Only the directory is searched, so accounts created by
    /// [`sign_up`](Self::sign_up) cannot sign in again. The password is not
    /// checked. An unknown email fails immediately; a known one waits out
    /// `sign_in_latency_ms` first.
    ///
    /// # Errors
    /// - [`AuthError::OperationInFlight`] if another sign-in or sign-up is
    ///   running; nothing else happens.
    /// - [`AuthError::UnknownEmail`] after raising an error notification.
    /// - [`AuthError::Storage`] / [`AuthError::Codec`] if the session
    ///   could not be written, after raising an error notification.
    /// - [`AuthError::Superseded`] if signed out while waiting.
    pub async fn sign_in(&self, email: &str, _password: &str) -> Result<UserProfile, AuthError> {
        let flight = self.begin()?;

        let Some(user) = self.directory.find_by_email(email) else {
            info!(email, "sign-in rejected: unknown email");
            self.notifications
                .error(SIGN_IN_FAILED_TITLE, SIGN_IN_FAILED_MESSAGE);
            return Err(AuthError::UnknownEmail(email.to_owned()));
        };

        time::sleep(self.config.sign_in_latency()).await;
        flight.ensure_current()?;

        if let Err(e) = self.persist(&user.id) {
            self.notifications.error(SIGN_IN_FAILED_TITLE, TRY_AGAIN_MESSAGE);
            return Err(e);
        }

        info!(user_id = %user.id, role = ?user.role, "signed in");
        let welcome = format!("{SIGN_IN_OK_PREFIX}{}", user.name);
        Ok(self.complete(flight, user, SIGN_IN_OK_TITLE, &welcome))
    }

    /// Creates a new account and signs in as it.
    ///
    /// Always succeeds unless storage fails. The new id is derived from
    /// the clock and never collides with a directory id or an earlier
    /// sign-up. Emails are not checked for uniqueness, and the new user is
    /// not added to the directory.
    ///
    /// # Errors
    /// Same as [`sign_in`](Self::sign_in), minus `UnknownEmail`.
    pub async fn sign_up(
        &self,
        email: &str,
        _password: &str,
        name: &str,
        role: Option<UserRole>,
    ) -> Result<UserProfile, AuthError> {
        let flight = self.begin()?;

        time::sleep(self.config.sign_up_latency()).await;
        flight.ensure_current()?;

        let user = UserProfile {
            id: self.fresh_user_id(),
            name: name.to_owned(),
            email: email.to_owned(),
            role,
            image_url: None,
        };

        if let Err(e) = self.persist(&user.id) {
            self.notifications.error(SIGN_UP_FAILED_TITLE, TRY_AGAIN_MESSAGE);
            return Err(e);
        }

        info!(user_id = %user.id, role = ?user.role, "signed up");
        Ok(self.complete(flight, user, SIGN_UP_OK_TITLE, SIGN_UP_OK_MESSAGE))
    }

    /// Signs out. Safe to call in any state, any number of times.
    ///
    /// Any sign-in or sign-up still waiting is abandoned.
    pub fn sign_out(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);

        if let Err(e) = self.sessions.clear() {
            warn!(error = %e, "failed to clear persisted session");
        }
        let previous = self.state.send_replace(AuthState::Unauthenticated);
        info!(previous = %previous, "signed out");

        self.navigator.push(HOME_PATH);
        self.notifications.info(SIGNED_OUT_TITLE, SIGNED_OUT_MESSAGE);
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// Moves to `Authenticating` unless already there.
    fn begin(&self) -> Result<InFlight<'_>, AuthError> {
        let mut previous = None;
        self.state.send_if_modified(|state| {
            if state.is_loading() {
                return false;
            }
            previous = Some(std::mem::replace(state, AuthState::Authenticating));
            true
        });

        match previous {
            Some(previous) => Ok(InFlight {
                manager: self,
                ticket: self.epoch.fetch_add(1, Ordering::SeqCst) + 1,
                previous: Some(previous),
            }),
            None => {
                warn!("authentication already in progress, rejecting");
                Err(AuthError::OperationInFlight)
            }
        }
    }

    fn persist(&self, user_id: &UserId) -> Result<(), AuthError> {
        let record = SessionRecord::issued_at(
            user_id.clone(),
            self.clock.now_millis(),
            self.config.session_ttl_ms,
        );
        self.sessions.save(&record).inspect_err(|e| {
            warn!(%user_id, error = %e, "failed to persist session");
        })
    }

    fn complete(
        &self,
        flight: InFlight<'_>,
        user: UserProfile,
        title: &str,
        message: &str,
    ) -> UserProfile {
        flight.finish(AuthState::Authenticated(user.clone()));
        self.notifications.success(title, message);
        if let Some(path) = user.home_path() {
            self.navigator.push(&path);
        }
        user
    }

    /// The clock in milliseconds, bumped past any id already taken.
    fn fresh_user_id(&self) -> UserId {
        let mut issued = self.issued_ids.lock().unwrap_or_else(PoisonError::into_inner);
        let mut millis = self.clock.now_millis();
        loop {
            let id = UserId::new(millis.to_string());
            if !issued.contains(&id) && self.directory.find_by_id(&id).is_none() {
                issued.insert(id.clone());
                return id;
            }
            millis += 1;
        }
    }
}

/// Holds the `Authenticating` state for one operation.
///
/// Dropped without [`finish`](Self::finish), it puts back whatever state
/// came before, unless a newer operation or a sign-out has taken over.
struct InFlight<'a> {
    manager: &'a AuthSessionManager,
    ticket: u64,
    previous: Option<AuthState>,
}

impl InFlight<'_> {
    fn is_current(&self) -> bool {
        self.manager.epoch.load(Ordering::SeqCst) == self.ticket
    }

    fn ensure_current(&self) -> Result<(), AuthError> {
        if self.is_current() {
            Ok(())
        } else {
            debug!(ticket = self.ticket, "authentication superseded");
            Err(AuthError::Superseded)
        }
    }

    fn finish(mut self, next: AuthState) {
        self.previous = None;
        self.manager.state.send_replace(next);
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            if self.is_current() {
                self.manager.state.send_replace(previous);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use waterwise_protocol::Variant;
    use waterwise_storage::MemoryStorage;

    use super::*;
    use crate::{ManualClock, RecordingNavigator, UserDirectory};

    const NOW: u64 = 1_700_000_000_000;

    struct Harness {
        manager: Arc<AuthSessionManager>,
        storage: MemoryStorage,
        navigator: RecordingNavigator,
        notifications: NotificationStore,
    }

    fn harness() -> Harness {
        harness_with(MemoryStorage::new(), AuthConfig::default())
    }

    fn harness_with(storage: MemoryStorage, config: AuthConfig) -> Harness {
        let navigator = RecordingNavigator::new();
        let notifications = NotificationStore::new();
        let manager = AuthSessionManager::new(
            AuthServices {
                directory: Arc::new(UserDirectory::builtin()),
                storage: Arc::new(storage.clone()),
                notifications: notifications.clone(),
                navigator: Arc::new(navigator.clone()),
                clock: Arc::new(ManualClock::at(NOW)),
            },
            config,
        );
        Harness {
            manager: Arc::new(manager),
            storage,
            navigator,
            notifications,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_sign_in_known_email_authenticates() {
        let h = harness();

        let user = h.manager.sign_in("consumer@example.com", "x").await.unwrap();

        assert_eq!(user.id.as_str(), "1");
        assert_eq!(h.manager.current_user(), Some(user));
        assert_eq!(h.navigator.history(), ["/consumer"]);
        let shown = h.notifications.notifications();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].variant, Variant::Success);
        assert_eq!(shown[0].message.as_deref(), Some("歡迎回來，李小明"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sign_in_waits_for_latency() {
        let h = harness();
        let manager = Arc::clone(&h.manager);
        let task = tokio::spawn(async move { manager.sign_in("company@example.com", "").await });

        time::sleep(Duration::from_millis(799)).await;
        assert!(h.manager.is_loading());

        time::sleep(Duration::from_millis(2)).await;
        assert!(h.manager.is_authenticated());
        task.await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_sign_in_unknown_email_restores_previous_state() {
        let h = harness();

        let err = h.manager.sign_in("who@example.com", "x").await.unwrap_err();

        assert!(matches!(err, AuthError::UnknownEmail(ref e) if e == "who@example.com"));
        assert_eq!(h.manager.state(), AuthState::Unauthenticated);
        assert!(h.storage.is_empty());
        assert!(h.navigator.history().is_empty());
        assert_eq!(h.notifications.notifications()[0].variant, Variant::Error);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sign_in_while_in_flight_is_rejected() {
        let h = harness();
        let manager = Arc::clone(&h.manager);
        let first = tokio::spawn(async move { manager.sign_in("consumer@example.com", "").await });
        tokio::task::yield_now().await;
        assert!(h.manager.is_loading());

        let err = h.manager.sign_up("a@b.c", "", "A", None).await.unwrap_err();
        assert!(matches!(err, AuthError::OperationInFlight));
        assert!(h.manager.is_loading());

        first.await.unwrap().unwrap();
        assert_eq!(h.notifications.len(), 1, "rejected call raises nothing");
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_sign_in_restores_state() {
        let h = harness();
        {
            let fut = h.manager.sign_in("consumer@example.com", "");
            let _ = time::timeout(Duration::from_millis(100), fut).await;
        }

        assert_eq!(h.manager.state(), AuthState::Unauthenticated);
        assert!(h.storage.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sign_out_during_sign_in_wins() {
        let h = harness();
        let manager = Arc::clone(&h.manager);
        let task = tokio::spawn(async move { manager.sign_in("consumer@example.com", "").await });
        tokio::task::yield_now().await;

        h.manager.sign_out();
        let result = task.await.unwrap();

        assert!(matches!(result, Err(AuthError::Superseded)));
        assert_eq!(h.manager.state(), AuthState::Unauthenticated);
        assert!(h.storage.is_empty());
        assert_eq!(h.navigator.history(), ["/"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sign_up_id_skips_taken_ids() {
        let h = harness();
        h.manager.sign_up("a@example.com", "", "A", None).await.unwrap();
        h.manager.sign_out();

        // Same clock reading: the second id must step past the first.
        let second = h.manager.sign_up("b@example.com", "", "B", None).await.unwrap();

        assert_eq!(second.id.as_str(), (NOW + 1).to_string());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sign_up_id_skips_directory_ids() {
        let taken = UserProfile {
            id: UserId::new(NOW.to_string()),
            name: "Taken".into(),
            email: "taken@example.com".into(),
            role: None,
            image_url: None,
        };
        let manager = AuthSessionManager::new(
            AuthServices {
                directory: Arc::new(UserDirectory::with_users(vec![taken])),
                storage: Arc::new(MemoryStorage::new()),
                notifications: NotificationStore::new(),
                navigator: Arc::new(RecordingNavigator::new()),
                clock: Arc::new(ManualClock::at(NOW)),
            },
            AuthConfig::default(),
        );

        let user = manager.sign_up("n@example.com", "", "N", None).await.unwrap();

        assert_eq!(user.id.as_str(), (NOW + 1).to_string());
    }

    #[tokio::test(start_paused = true)]
    async fn test_role_less_user_is_not_navigated() {
        let h = harness();
        h.manager.sign_up("r@example.com", "", "R", None).await.unwrap();
        assert!(h.navigator.history().is_empty());
    }

    #[test]
    fn test_restore_expired_session_when_enforced() {
        let storage = MemoryStorage::new();
        storage
            .set_item("waterwise_session", r#"{"userId":"1","expiresAt":1}"#)
            .unwrap();

        let lenient = harness_with(storage.clone(), AuthConfig::default());
        assert!(lenient.manager.is_authenticated());

        let strict = harness_with(
            storage.clone(),
            AuthConfig {
                enforce_session_expiry: true,
                ..AuthConfig::default()
            },
        );
        assert!(!strict.manager.is_authenticated());
        assert!(storage.is_empty(), "expired record is cleared");
    }
}
