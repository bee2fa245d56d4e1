//! Error types for the notification layer.

use waterwise_protocol::NotificationId;

/// Errors that can occur while rendering or interacting with notifications.
///
/// The store itself never fails; only renderer operations do.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// The renderer needs a Tokio runtime for its timers and was mounted
    /// outside one.
    #[error("notification renderer must be mounted inside a Tokio runtime")]
    NoRuntime,

    /// No rendered entry has this id (never added, or already purged).
    #[error("notification {0} not found")]
    NotFound(NotificationId),

    /// The notification exists but has no action at this index.
    #[error("notification {id} has no action at index {index}")]
    ActionNotFound { id: NotificationId, index: usize },

    /// The portal refused to attach a container.
    #[error("portal unavailable: {0}")]
    Portal(String),
}
