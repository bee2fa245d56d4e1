//! Codec trait and implementations for persisted records.
//!
//! The session store doesn't care HOW a [`SessionRecord`](crate::SessionRecord)
//! is turned into bytes; it only needs something that implements
//! [`Codec`]. JSON is the only format today because the persisted layout
//! is fixed as `{"userId": "...", "expiresAt": 0}`.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// Encodes values to bytes and decodes bytes back.
///
/// `Send + Sync + 'static` because the codec lives inside long-lived,
/// shared services (the session store is held behind an `Arc`).
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected shape.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// A [`Codec`] backed by `serde_json`.
///
/// ## Example
///
/// ```rust
/// use waterwise_protocol::{Codec, JsonCodec, SessionRecord, UserId};
///
/// let codec = JsonCodec;
/// let record = SessionRecord::new(UserId::from("1"), 1_700_000_000_000);
///
/// let bytes = codec.encode(&record).unwrap();
/// let decoded: SessionRecord = codec.decode(&bytes).unwrap();
/// assert_eq!(record, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{SessionRecord, UserId};

    #[test]
    fn test_json_codec_encodes_session_in_persisted_layout() {
        let record = SessionRecord::new(UserId::from("2"), 42);

        let bytes = JsonCodec.encode(&record).unwrap();

        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            r#"{"userId":"2","expiresAt":42}"#
        );
    }

    #[test]
    fn test_json_codec_decode_garbage_returns_decode_error() {
        let result: Result<SessionRecord, _> = JsonCodec.decode(b"{not json");

        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_json_codec_decode_missing_field_returns_decode_error() {
        let result: Result<SessionRecord, _> = JsonCodec.decode(br#"{"userId":"1"}"#);

        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }
}
