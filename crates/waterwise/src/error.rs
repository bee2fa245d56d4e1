//! Unified error type for WaterWise.

use std::path::PathBuf;

use waterwise_auth::AuthError;
use waterwise_notify::NotifyError;
use waterwise_protocol::ProtocolError;
use waterwise_storage::StorageError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each wrapping variant lets `?` convert
/// sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum WaterwiseError {
    /// Encoding or decoding a persisted value.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Durable storage I/O or corruption.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Mounting or driving the notification renderer.
    #[error(transparent)]
    Notify(#[from] NotifyError),

    /// Sign-in, sign-up, or session persistence.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The config file could not be read.
    #[error("failed to read config {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid JSON for [`WaterwiseConfig`](crate::WaterwiseConfig).
    #[error("invalid config {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
