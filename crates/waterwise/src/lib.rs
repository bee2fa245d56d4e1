//! # WaterWise
//!
//! Session and notification core for the WaterWise water-usage dashboard.
//!
//! The sub-crates each own one concern: shared types and codecs
//! (`waterwise-protocol`), durable key-value storage (`waterwise-storage`),
//! the notification store and renderer (`waterwise-notify`), and the
//! sign-in state machine (`waterwise-auth`). This crate wires them into a
//! single [`WaterwiseApp`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use waterwise::prelude::*;
//!
//! # async fn run() -> Result<(), WaterwiseError> {
//! let app = WaterwiseApp::builder()
//!     .config(WaterwiseConfig::default())
//!     .build()?;
//!
//! app.auth().sign_in("consumer@example.com", "password").await?;
//! assert!(app.auth().is_authenticated());
//! # Ok(())
//! # }
//! ```

mod app;
mod config;
mod error;
mod telemetry;

pub use app::{WaterwiseApp, WaterwiseAppBuilder};
pub use config::WaterwiseConfig;
pub use error::WaterwiseError;
pub use telemetry::init_tracing;

pub use waterwise_auth as auth;
pub use waterwise_notify as notify;
pub use waterwise_protocol as protocol;
pub use waterwise_storage as storage;

/// Everything an application embedding WaterWise usually needs.
pub mod prelude {
    pub use crate::{WaterwiseApp, WaterwiseAppBuilder, WaterwiseConfig, WaterwiseError};

    pub use waterwise_auth::{
        AuthConfig, AuthError, AuthSessionManager, AuthState, Clock, Directory, Navigator,
        RecordingNavigator, SystemClock, UserDirectory,
    };
    pub use waterwise_notify::{
        HeadlessPortal, NewNotification, Notification, NotificationAction, NotificationRenderer,
        NotificationStore, Portal, RendererConfig,
    };
    pub use waterwise_protocol::{UserId, UserProfile, UserRole, Variant};
    pub use waterwise_storage::{FileStorage, KeyValueStorage, MemoryStorage};
}
