//! Error types for the protocol layer.

/// Errors that can occur while encoding or decoding WaterWise records.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust value into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust value).
    ///
    /// Common causes: malformed JSON, missing `userId`/`expiresAt`,
    /// or a number where a string was expected.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The value parsed but is not a valid WaterWise value
    /// (for example an unknown role name).
    #[error("invalid value: {0}")]
    InvalidValue(String),
}
