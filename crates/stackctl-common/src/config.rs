//! Global configuration model for the stackctl client.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, StackctlError};

/// Root configuration for the stackctl client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StackctlConfig {
    /// Base URL of the orchestration API.
    pub server: String,
    /// Path to the cached login credentials.
    pub credentials_file: PathBuf,
    /// Catalog used by service operations unless overridden.
    pub default_catalog: String,
}

impl Default for StackctlConfig {
    fn default() -> Self {
        Self {
            server: crate::constants::DEFAULT_SERVER.to_string(),
            credentials_file: crate::constants::default_credentials_file(),
            default_catalog: crate::constants::DEFAULT_CATALOG.to_string(),
        }
    }
}

impl StackctlConfig {
    /// Loads configuration from a JSON file, falling back to defaults when the
    /// file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| StackctlError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self = serde_json::from_str(&content)?;
        tracing::debug!(path = %path.display(), server = %config.server, "loaded config");
        Ok(config)
    }

    /// Returns a copy with the server replaced when an override is given.
    #[must_use]
    pub fn with_server(mut self, server: Option<String>) -> Self {
        if let Some(server) = server {
            self.server = server;
        }
        self
    }
}
