//! `WaterwiseApp` builder and wiring.
//!
//! Ties the layers together: storage → session store → auth manager, and
//! notification store → renderer → portal. The auth manager reports into
//! the same store the renderer draws from.

use std::sync::Arc;

use tracing::info;
use waterwise_auth::{
    AuthServices, AuthSessionManager, Clock, Directory, Navigator, RecordingNavigator,
    SystemClock, UserDirectory,
};
use waterwise_notify::{HeadlessPortal, NotificationRenderer, NotificationStore, Portal};
use waterwise_storage::{KeyValueStorage, MemoryStorage};

use crate::{WaterwiseConfig, WaterwiseError};

/// Builder for a [`WaterwiseApp`].
///
/// Every collaborator has a headless default, so the smallest working
/// app is `WaterwiseApp::builder().build()?` inside a Tokio runtime:
/// in-memory storage, the built-in directory, a recording navigator, a
/// headless portal, and the system clock.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use waterwise::prelude::*;
///
/// # fn run() -> Result<(), WaterwiseError> {
/// let app = WaterwiseApp::builder()
///     .storage(Arc::new(FileStorage::open("session.json")))
///     .portal(Arc::new(HeadlessPortal::new()))
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct WaterwiseAppBuilder {
    config: WaterwiseConfig,
    storage: Option<Arc<dyn KeyValueStorage>>,
    directory: Option<Arc<dyn Directory>>,
    navigator: Option<Arc<dyn Navigator>>,
    portal: Option<Arc<dyn Portal>>,
    clock: Option<Arc<dyn Clock>>,
    notifications: Option<NotificationStore>,
}

impl WaterwiseAppBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: WaterwiseConfig) -> Self {
        self.config = config;
        self
    }

    /// Where the session record is persisted.
    pub fn storage(mut self, storage: Arc<dyn KeyValueStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn directory(mut self, directory: Arc<dyn Directory>) -> Self {
        self.directory = Some(directory);
        self
    }

    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    pub fn portal(mut self, portal: Arc<dyn Portal>) -> Self {
        self.portal = Some(portal);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Shares an existing notification store instead of creating one.
    pub fn notifications(mut self, store: NotificationStore) -> Self {
        self.notifications = Some(store);
        self
    }

    /// Mounts the renderer and restores any persisted session.
    ///
    /// # Errors
    /// [`WaterwiseError::Notify`] if called outside a Tokio runtime or the
    /// portal refuses a container.
    pub fn build(self) -> Result<WaterwiseApp, WaterwiseError> {
        let config = self.config.validated();
        let notifications = self.notifications.unwrap_or_default();
        let portal = self
            .portal
            .unwrap_or_else(|| Arc::new(HeadlessPortal::new()));

        let renderer =
            NotificationRenderer::mount(&notifications, portal, config.renderer.clone())?;

        let auth = AuthSessionManager::new(
            AuthServices {
                directory: self
                    .directory
                    .unwrap_or_else(|| Arc::new(UserDirectory::builtin())),
                storage: self
                    .storage
                    .unwrap_or_else(|| Arc::new(MemoryStorage::new())),
                notifications: notifications.clone(),
                navigator: self
                    .navigator
                    .unwrap_or_else(|| Arc::new(RecordingNavigator::new())),
                clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            },
            config.auth.clone(),
        );

        info!(state = %auth.state(), "waterwise app ready");
        Ok(WaterwiseApp {
            config,
            notifications,
            renderer,
            auth,
        })
    }
}

/// A running WaterWise core: one auth manager, one notification store,
/// one mounted renderer.
pub struct WaterwiseApp {
    config: WaterwiseConfig,
    notifications: NotificationStore,
    renderer: NotificationRenderer,
    auth: AuthSessionManager,
}

impl WaterwiseApp {
    /// Creates a new builder.
    pub fn builder() -> WaterwiseAppBuilder {
        WaterwiseAppBuilder::new()
    }

    pub fn auth(&self) -> &AuthSessionManager {
        &self.auth
    }

    pub fn notifications(&self) -> &NotificationStore {
        &self.notifications
    }

    pub fn renderer(&self) -> &NotificationRenderer {
        &self.renderer
    }

    /// The validated configuration in effect.
    pub fn config(&self) -> &WaterwiseConfig {
        &self.config
    }

    /// Unmounts the renderer. Pending notification timers are cancelled;
    /// the persisted session is left alone.
    pub fn shutdown(self) {
        self.renderer.unmount();
        info!("waterwise app shut down");
    }
}
