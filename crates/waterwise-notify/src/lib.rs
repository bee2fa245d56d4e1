//! Notification dispatch for WaterWise.
//!
//! Two cooperating pieces:
//!
//! - [`NotificationStore`]: the process-wide list of active notifications,
//!   with synchronous, ordered publish/subscribe
//! - [`NotificationRenderer`]: mounts the list into a [`Portal`] and runs
//!   each entry's auto-dismiss countdown
//!
//! # How it fits in the stack
//!
//! ```text
//! Auth layer (above)  ← emits success/error/info notifications
//!     ↕
//! Notify layer (this crate)  ← owns the live list, timers, and rendering
//!     ↕
//! Protocol layer (below)  ← provides NotificationId, Variant
//! ```

mod config;
mod error;
mod notification;
mod portal;
mod renderer;
mod store;

pub use config::RendererConfig;
pub use error::NotifyError;
pub use notification::{ActionStyle, NewNotification, Notification, NotificationAction};
pub use portal::{ContainerId, HeadlessPortal, Portal, RenderedAction, RenderedEntry};
pub use renderer::NotificationRenderer;
pub use store::{NotificationStore, Subscription};
