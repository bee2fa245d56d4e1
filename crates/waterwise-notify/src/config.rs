//! Renderer configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Timing knobs for the [`NotificationRenderer`](crate::NotificationRenderer).
///
/// Both values are kept configurable so tests can run with short delays
/// (or Tokio's paused clock) instead of the production defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Countdown for notifications that don't set their own duration.
    /// Default: 5000 ms.
    pub default_duration_ms: u64,

    /// Delay between a notification turning invisible and being purged
    /// from the store, leaving room for an exit animation. Default: 300 ms.
    pub exit_delay_ms: u64,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            default_duration_ms: 5_000,
            exit_delay_ms: 300,
        }
    }
}

impl RendererConfig {
    /// Upper bound on the exit delay. Anything longer leaves invisible
    /// entries lingering in the store.
    pub const MAX_EXIT_DELAY_MS: u64 = 10_000;

    /// Clamps out-of-range values. Called by the renderer on mount.
    pub fn validated(mut self) -> Self {
        if self.exit_delay_ms > Self::MAX_EXIT_DELAY_MS {
            warn!(
                exit_delay_ms = self.exit_delay_ms,
                max = Self::MAX_EXIT_DELAY_MS,
                "exit_delay_ms exceeds maximum, clamping"
            );
            self.exit_delay_ms = Self::MAX_EXIT_DELAY_MS;
        }
        self
    }

    pub fn default_duration(&self) -> Duration {
        Duration::from_millis(self.default_duration_ms)
    }

    pub fn exit_delay(&self) -> Duration {
        Duration::from_millis(self.exit_delay_ms)
    }
}
