//! Logging setup for binaries embedding WaterWise.

use tracing_subscriber::EnvFilter;

/// Installs a `tracing` subscriber that reads `RUST_LOG`, falling back to
/// `default_filter` (e.g. `"info"`).
///
/// Does nothing if a global subscriber is already set, so calling it
/// twice (or from tests) is harmless.
pub fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
