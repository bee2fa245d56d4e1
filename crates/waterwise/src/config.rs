//! Top-level configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use waterwise_auth::AuthConfig;
use waterwise_notify::RendererConfig;

use crate::WaterwiseError;

/// All WaterWise settings in one place.
///
/// Every field has a default, so a config file only needs to name what it
/// changes:
///
/// ```json
/// { "auth": { "enforce_session_expiry": true } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaterwiseConfig {
    pub auth: AuthConfig,
    pub renderer: RendererConfig,
}

impl WaterwiseConfig {
    /// Reads a JSON config file.
    ///
    /// # Errors
    /// [`WaterwiseError::ConfigRead`] if the file can't be read,
    /// [`WaterwiseError::ConfigParse`] if it isn't a valid config.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, WaterwiseError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| WaterwiseError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&text).map_err(|source| WaterwiseError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Clamps out-of-range values in every section.
    pub fn validated(self) -> Self {
        Self {
            auth: self.auth.validated(),
            renderer: self.renderer.validated(),
        }
    }
}
