//! Shared data model for WaterWise.
//!
//! This crate defines the values every other layer passes around:
//!
//! - **Types** ([`UserProfile`], [`SessionRecord`], [`Variant`], etc.):
//!   the identity, session, and notification vocabulary.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how a persisted record
//!   is converted to/from bytes.
//! - **Errors** ([`ProtocolError`]): what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! ```text
//! Storage (bytes) → Protocol (SessionRecord) → Auth (current user)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{NotificationId, SessionRecord, UserId, UserProfile, UserRole, Variant};
