//! Core value types shared by the auth and notification layers.
//!
//! Everything here is plain data: identities, the persisted session
//! record, and the notification severity vocabulary. None of these types
//! know about storage, timers, or navigation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Opaque identifier for a user.
///
/// Directory users have short numeric ids (`"1"`, `"2"`, `"3"`); users
/// created by sign-up get a timestamp-derived id. Either way the value is
/// compared as a string and never parsed.
///
/// `#[serde(transparent)]` keeps it a bare JSON string, which the
/// persisted `{"userId": "..."}` layout requires.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wraps a raw id string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrows the underlying string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One of the three fixed personas.
///
/// The role decides which dashboard a user lands on after signing in:
/// `consumer` → `/consumer`, and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Consumer,
    Company,
    Government,
}

impl UserRole {
    /// All roles, in display order.
    pub const ALL: [UserRole; 3] = [Self::Consumer, Self::Company, Self::Government];

    /// The lowercase wire name (`"consumer"`, `"company"`, `"government"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Consumer => "consumer",
            Self::Company => "company",
            Self::Government => "government",
        }
    }

    /// The dashboard route for this role, e.g. `/company`.
    pub fn home_path(&self) -> String {
        format!("/{}", self.as_str())
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "consumer" => Ok(Self::Consumer),
            "company" => Ok(Self::Company),
            "government" => Ok(Self::Government),
            other => Err(ProtocolError::InvalidValue(format!("unknown role `{other}`"))),
        }
    }
}

/// A user's identity record.
///
/// Immutable once issued: there is no update path. Profiles come either
/// from the built-in directory or from a successful sign-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Unique id, referenced by [`SessionRecord::user_id`].
    pub id: UserId,

    /// Display name shown in the dashboard header.
    pub name: String,

    /// Login key. Matched case-insensitively.
    pub email: String,

    /// Persona, or `None` when the user never picked one.
    pub role: Option<UserRole>,

    /// Avatar path, e.g. `/avatars/consumer.png`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl UserProfile {
    /// Returns `true` if `email` identifies this user, ignoring ASCII and
    /// Unicode case.
    pub fn matches_email(&self, email: &str) -> bool {
        self.email.to_lowercase() == email.to_lowercase()
    }

    /// Where this user should be sent after authenticating.
    ///
    /// `None` for a role-less user: no redirect happens.
    pub fn home_path(&self) -> Option<String> {
        self.role.map(|role| role.home_path())
    }
}

// ---------------------------------------------------------------------------
// SessionRecord
// ---------------------------------------------------------------------------

/// The one durable record: who is signed in, and until when.
///
/// Serialized as `{"userId": "<string>", "expiresAt": <epoch ms>}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    /// The signed-in user.
    pub user_id: UserId,

    /// Absolute expiry as milliseconds since the Unix epoch.
    pub expires_at: u64,
}

impl SessionRecord {
    /// Creates a record for `user_id` expiring at `expires_at` (epoch ms).
    pub fn new(user_id: UserId, expires_at: u64) -> Self {
        Self {
            user_id,
            expires_at,
        }
    }

    /// Creates a record that expires `ttl_ms` after `now_ms`.
    pub fn issued_at(user_id: UserId, now_ms: u64, ttl_ms: u64) -> Self {
        Self::new(user_id, now_ms.saturating_add(ttl_ms))
    }

    /// Returns `true` once `now_ms` has reached the expiry.
    pub fn is_expired_at(&self, now_ms: u64) -> bool {
        now_ms >= self.expires_at
    }
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

/// Unique id of a live notification, e.g. `notification-1700000000000-k3j9x0q2a`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(String);

impl NotificationId {
    /// Wraps a raw id string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrows the underlying string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Severity of a notification. Controls its icon and color treatment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Success => write!(f, "success"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}
