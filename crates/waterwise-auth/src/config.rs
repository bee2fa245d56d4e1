//! Auth configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Default storage key for the persisted session record.
pub const DEFAULT_STORAGE_KEY: &str = "waterwise_session";

const SEVEN_DAYS_MS: u64 = 7 * 24 * 60 * 60 * 1_000;

/// Configuration for the [`AuthSessionManager`](crate::AuthSessionManager).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Key the session record is stored under.
    pub storage_key: String,

    /// Simulated round trip for sign-in. Default: 800 ms.
    pub sign_in_latency_ms: u64,

    /// Simulated round trip for sign-up. Default: 1000 ms.
    pub sign_up_latency_ms: u64,

    /// Lifetime written into new session records. Default: 7 days.
    pub session_ttl_ms: u64,

    /// When `true`, a restored record past its `expiresAt` is discarded
    /// instead of signing the user back in. Default: `false`.
    pub enforce_session_expiry: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_owned(),
            sign_in_latency_ms: 800,
            sign_up_latency_ms: 1_000,
            session_ttl_ms: SEVEN_DAYS_MS,
            enforce_session_expiry: false,
        }
    }
}

impl AuthConfig {
    /// Upper bound on either simulated latency.
    pub const MAX_LATENCY_MS: u64 = 60_000;

    /// Fixes values that would make the manager misbehave.
    pub fn validated(mut self) -> Self {
        if self.storage_key.trim().is_empty() {
            warn!("storage_key is empty, using default");
            self.storage_key = DEFAULT_STORAGE_KEY.to_owned();
        }
        for (name, latency) in [
            ("sign_in_latency_ms", &mut self.sign_in_latency_ms),
            ("sign_up_latency_ms", &mut self.sign_up_latency_ms),
        ] {
            if *latency > Self::MAX_LATENCY_MS {
                warn!(
                    field = name,
                    value = *latency,
                    max = Self::MAX_LATENCY_MS,
                    "latency exceeds maximum, clamping"
                );
                *latency = Self::MAX_LATENCY_MS;
            }
        }
        if self.session_ttl_ms == 0 {
            warn!("session_ttl_ms is 0, using default");
            self.session_ttl_ms = SEVEN_DAYS_MS;
        }
        self
    }

    pub fn sign_in_latency(&self) -> Duration {
        Duration::from_millis(self.sign_in_latency_ms)
    }

    pub fn sign_up_latency(&self) -> Duration {
        Duration::from_millis(self.sign_up_latency_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_config_default() {
        let config = AuthConfig::default();
        assert_eq!(config.storage_key, "waterwise_session");
        assert_eq!(config.sign_in_latency(), Duration::from_millis(800));
        assert_eq!(config.sign_up_latency(), Duration::from_secs(1));
        assert_eq!(config.session_ttl_ms, 604_800_000);
        assert!(!config.enforce_session_expiry);
    }

    #[test]
    fn test_validated_restores_empty_key() {
        let config = AuthConfig {
            storage_key: "  ".into(),
            ..AuthConfig::default()
        }
        .validated();
        assert_eq!(config.storage_key, DEFAULT_STORAGE_KEY);
    }

    #[test]
    fn test_validated_clamps_latency() {
        let config = AuthConfig {
            sign_in_latency_ms: 120_000,
            sign_up_latency_ms: 90_000,
            ..AuthConfig::default()
        }
        .validated();
        assert_eq!(config.sign_in_latency_ms, AuthConfig::MAX_LATENCY_MS);
        assert_eq!(config.sign_up_latency_ms, AuthConfig::MAX_LATENCY_MS);
    }

    #[test]
    fn test_validated_replaces_zero_ttl() {
        let config = AuthConfig {
            session_ttl_ms: 0,
            ..AuthConfig::default()
        }
        .validated();
        assert_eq!(config.session_ttl_ms, SEVEN_DAYS_MS);
    }
}
