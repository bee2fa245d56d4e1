//! Route changes requested by the auth layer.

use std::sync::{Arc, Mutex, PoisonError};

/// The landing route, used after sign-out.
pub const HOME_PATH: &str = "/";

/// Pushes a new route onto the client's history.
pub trait Navigator: Send + Sync + 'static {
    fn push(&self, path: &str);
}

/// A [`Navigator`] that only records the paths it was asked to visit.
///
/// Clones share history.
#[derive(Debug, Clone, Default)]
pub struct RecordingNavigator {
    history: Arc<Mutex<Vec<String>>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every pushed path, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The most recent path, if any.
    pub fn current(&self) -> Option<String> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }
}

impl Navigator for RecordingNavigator {
    fn push(&self, path: &str) {
        tracing::debug!(path, "navigate");
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path.to_owned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_navigator_keeps_order() {
        let nav = RecordingNavigator::new();
        let shared = nav.clone();
        assert_eq!(nav.current(), None);

        nav.push("/consumer");
        nav.push(HOME_PATH);

        assert_eq!(shared.history(), ["/consumer", "/"]);
        assert_eq!(shared.current().as_deref(), Some("/"));
    }
}
