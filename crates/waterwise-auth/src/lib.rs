//! Session and authentication simulation for WaterWise.
//!
//! This crate decides who the current user is:
//!
//! 1. **Directory**: the known users ([`Directory`] trait, [`UserDirectory`])
//! 2. **Persistence**: the single durable session record ([`SessionStore`])
//! 3. **State machine**: sign-in, sign-up, sign-out, and restore on start
//!    ([`AuthSessionManager`])
//!
//! # How it fits in the stack
//!
//! ```text
//! UI / demo (above)  ← calls sign_in / sign_up / sign_out, watches AuthState
//!     ↕
//! Auth layer (this crate)  ← owns the current user, emits notifications, navigates
//!     ↕
//! Notify + Storage + Protocol (below)
//! ```
//!
//! Passwords are accepted unconditionally when the email is known. This is
//! a demo stub, not a credential check.

mod clock;
mod config;
mod directory;
mod error;
mod manager;
mod navigator;
mod session_store;
mod state;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{AuthConfig, DEFAULT_STORAGE_KEY};
pub use directory::{Directory, UserDirectory};
pub use error::AuthError;
pub use manager::{AuthServices, AuthSessionManager, SIGN_UP_PASSWORD_HINT_LEN};
pub use navigator::{Navigator, RecordingNavigator, HOME_PATH};
pub use session_store::SessionStore;
pub use state::AuthState;
