//! Connection context threaded through every API call.

use reqwest::Url;
use stackctl_common::error::{Result, StackctlError};
use stackctl_common::types::ProjectId;

use crate::credentials::Credentials;

/// Server endpoint and, once logged in, the user's identity and token.
#[derive(Debug, Clone)]
pub struct Session {
    server: Url,
    username: Option<String>,
    token: Option<String>,
}

impl Session {
    /// Creates an unauthenticated session for `server`.
    ///
    /// # Errors
    ///
    /// Returns `StackctlError::Config` if `server` is not an absolute
    /// `http`/`https` URL.
    pub fn anonymous(server: &str) -> Result<Self> {
        let mut url = Url::parse(server).map_err(|e| StackctlError::Config {
            message: format!("invalid server URL \"{server}\": {e}"),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(StackctlError::Config {
                message: format!("server URL must use http or https: {server}"),
            });
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(Self {
            server: url,
            username: None,
            token: None,
        })
    }

    /// Creates a session authenticated with cached `credentials`.
    ///
    /// # Errors
    ///
    /// Returns `StackctlError::Config` if `server` is not a valid URL.
    pub fn authenticated(server: &str, credentials: &Credentials) -> Result<Self> {
        let mut session = Self::anonymous(server)?;
        session.username = Some(credentials.username.clone());
        session.token = Some(credentials.token.clone());
        Ok(session)
    }

    /// Returns the server base URL (always ending in `/`).
    #[must_use]
    pub const fn server(&self) -> &Url {
        &self.server
    }

    /// Returns the bearer token, if logged in.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Returns the logged-in username, if any.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Returns the project the logged-in user works in.
    ///
    /// # Errors
    ///
    /// Returns `StackctlError::NotAuthenticated` for anonymous sessions.
    pub fn project(&self) -> Result<ProjectId> {
        self.username
            .as_deref()
            .map(ProjectId::new)
            .ok_or(StackctlError::NotAuthenticated)
    }

    /// Builds the URL for an API path given as raw segments.
    ///
    /// Segments are percent-encoded, so keys containing `/` or spaces cannot
    /// escape their position in the path.
    ///
    /// # Errors
    ///
    /// Returns `StackctlError::Config` if the server URL cannot carry a path.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.server.clone();
        {
            let mut path = url.path_segments_mut().map_err(|()| StackctlError::Config {
                message: format!("server URL cannot be a base: {}", self.server),
            })?;
            let _ = path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_session_has_no_project() {
        let session = Session::anonymous("http://localhost:8083").expect("session");
        assert!(session.token().is_none());
        assert!(matches!(session.project(), Err(StackctlError::NotAuthenticated)));
    }

    #[test]
    fn authenticated_session_uses_username_as_project() {
        let creds = Credentials::new("alice", "tok");
        let session = Session::authenticated("http://localhost:8083", &creds).expect("session");
        assert_eq!(session.project().expect("project").as_str(), "alice");
        assert_eq!(session.token(), Some("tok"));
    }

    #[test]
    fn endpoint_appends_segments_under_base_path() {
        let session = Session::anonymous("https://api.example.org/v1").expect("session");
        let url = session.endpoint(&["projects", "alice", "stacks"]).expect("url");
        assert_eq!(url.as_str(), "https://api.example.org/v1/projects/alice/stacks");
    }

    #[test]
    fn endpoint_encodes_segments() {
        let session = Session::anonymous("http://localhost:8083/").expect("session");
        let url = session.endpoint(&["services", "a/b c"]).expect("url");
        assert_eq!(url.as_str(), "http://localhost:8083/services/a%2Fb%20c");
    }

    #[test]
    fn rejects_non_http_servers() {
        assert!(Session::anonymous("ftp://example.org").is_err());
        assert!(Session::anonymous("not a url").is_err());
    }
}
