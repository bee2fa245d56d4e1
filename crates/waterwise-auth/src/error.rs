//! Error types for the auth layer.

use waterwise_protocol::ProtocolError;
use waterwise_storage::StorageError;

/// Errors returned by [`AuthSessionManager`](crate::AuthSessionManager) and
/// [`SessionStore`](crate::SessionStore).
///
/// By the time the manager returns one of these, it has already surfaced
/// it to the user as a notification where appropriate. Callers only need
/// the value to decide whether to keep the form open.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No directory user has this email.
    #[error("no user registered with email {0}")]
    UnknownEmail(String),

    /// Another sign-in or sign-up is still running on this manager.
    #[error("another authentication is already in progress")]
    OperationInFlight,

    /// A sign-out or a newer sign-in happened while this operation was
    /// waiting; its result was discarded.
    #[error("authentication superseded by a newer operation")]
    Superseded,

    /// Reading or writing durable storage failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Encoding the session record failed.
    #[error(transparent)]
    Codec(#[from] ProtocolError),
}
