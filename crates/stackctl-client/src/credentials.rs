//! File-backed cache of login credentials.
//!
//! A successful login stores the username and API token so later commands
//! can build an authenticated [`Session`](crate::session::Session) without
//! prompting again.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stackctl_common::error::{Result, StackctlError};

/// Cached login for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Account name, which is also the project the user works in.
    pub username: String,
    /// Bearer token issued by the server.
    pub token: String,
    /// When the token was stored.
    pub saved_at: DateTime<Utc>,
}

impl Credentials {
    /// Creates credentials stamped with the current time.
    #[must_use]
    pub fn new(username: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            token: token.into(),
            saved_at: Utc::now(),
        }
    }
}

/// Credential store backed by a JSON file.
#[derive(Debug, Clone)]
pub struct CredentialCache {
    path: PathBuf,
}

impl CredentialCache {
    /// Creates a cache stored at `path`. Nothing is read until [`load`](Self::load).
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the cached credentials.
    ///
    /// # Errors
    ///
    /// Returns `StackctlError::NotAuthenticated` if nothing is cached, or an
    /// I/O or parse error if the file is unreadable.
    pub fn load(&self) -> Result<Credentials> {
        if !self.path.exists() {
            return Err(StackctlError::NotAuthenticated);
        }
        let content = std::fs::read_to_string(&self.path).map_err(|e| StackctlError::Io {
            path: self.path.clone(),
            source: e,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Writes `credentials`, creating the parent directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn save(&self, credentials: &Credentials) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StackctlError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let json = serde_json::to_string_pretty(credentials)?;
        std::fs::write(&self.path, json).map_err(|e| StackctlError::Io {
            path: self.path.clone(),
            source: e,
        })?;
        restrict_permissions(&self.path)?;
        tracing::debug!(path = %self.path.display(), user = %credentials.username, "saved credentials");
        Ok(())
    }

    /// Replaces the cached token, keeping the username.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache cannot be read or written.
    pub fn update_token(&self, token: impl Into<String>) -> Result<Credentials> {
        let current = self.load()?;
        let updated = Credentials::new(current.username, token);
        self.save(&updated)?;
        Ok(updated)
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).map_err(|e| {
        StackctlError::Io {
            path: path.to_path_buf(),
            source: e,
        }
    })
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
