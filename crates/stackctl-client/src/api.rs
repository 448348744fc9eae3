//! Blocking REST client for the orchestration API.

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use stackctl_common::error::{Result, StackctlError};
use stackctl_common::types::{ProjectId, ServiceKey, StackId};
use stackctl_compose::catalog::{CatalogLookup, ServiceDefinition};
use stackctl_compose::resolver::StackComposition;
use stackctl_compose::submission::{PersistedStack, StackSubmission};

use crate::models::{LoginRequest, Project, TokenResponse, Volume};
use crate::session::Session;

/// Client for one server, acting as the session's user.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    session: Session,
}

impl ApiClient {
    /// Creates a client for `session`.
    ///
    /// # Errors
    ///
    /// Returns `StackctlError::Transport` if the HTTP client cannot be built.
    pub fn new(session: Session) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("stackctl/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(transport)?;
        Ok(Self { http, session })
    }

    /// Returns the session this client acts for.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Exchanges a username and password for an API token.
    ///
    /// # Errors
    ///
    /// Returns `StackctlError::Api` if the server rejects the credentials.
    pub fn login(&self, username: &str, password: &str) -> Result<String> {
        tracing::info!(user = username, server = %self.session.server(), "logging in");
        let body = LoginRequest { username, password };
        let request = self.request(Method::POST, &["authenticate"], None)?.json(&body);
        let response: TokenResponse = self.send_json(request)?;
        Ok(response.token)
    }

    /// Exchanges the session token for a fresh one.
    ///
    /// # Errors
    ///
    /// Returns `StackctlError::NotAuthenticated` for anonymous sessions, or an
    /// API error if the token has expired.
    pub fn refresh_token(&self) -> Result<String> {
        let token = self.session_token()?;
        let request = self.request(Method::GET, &["refresh_token"], Some(token))?;
        let response: TokenResponse = self.send_json(request)?;
        Ok(response.token)
    }

    /// Registers a service definition in the system catalog.
    ///
    /// `document` is sent as given, so fields the client does not model survive.
    ///
    /// # Errors
    ///
    /// Returns an API error if the server rejects the definition.
    pub fn add_service(
        &self,
        document: &serde_json::Value,
        admin_token: &str,
    ) -> Result<ServiceDefinition> {
        let request = self
            .request(Method::POST, &["services"], Some(admin_token))?
            .json(document);
        self.send_json(request)
    }

    /// Removes a service from `catalog`.
    ///
    /// # Errors
    ///
    /// Returns `StackctlError::UnknownService` if the catalog has no such
    /// service, or another API error.
    pub fn delete_service(&self, key: &ServiceKey, token: &str, catalog: &str) -> Result<()> {
        let request = self
            .request(Method::DELETE, &["services", key.as_str()], Some(token))?
            .query(&[("catalog", catalog)]);
        let _ = self
            .send(request)
            .map_err(|e| unknown_on_not_found(e, key))?;
        Ok(())
    }

    /// Creates a project.
    ///
    /// # Errors
    ///
    /// Returns an API error if the server rejects the project.
    pub fn add_project(&self, project: &Project, admin_token: &str) -> Result<()> {
        let request = self
            .request(Method::POST, &["projects"], Some(admin_token))?
            .json(project);
        let _ = self.send(request)?;
        Ok(())
    }

    /// Deletes a project (account) and everything it owns.
    ///
    /// # Errors
    ///
    /// Returns an API error if the account does not exist.
    pub fn delete_account(&self, id: &str, admin_token: &str) -> Result<()> {
        let request = self.request(Method::DELETE, &["projects", id], Some(admin_token))?;
        let _ = self.send(request)?;
        Ok(())
    }

    /// Submits a composition as a new stack in `project`.
    ///
    /// # Errors
    ///
    /// Returns `StackctlError::Submission` if the server rejects the stack.
    pub fn add_stack(
        &self,
        project: &ProjectId,
        composition: &StackComposition,
    ) -> Result<PersistedStack> {
        let token = self.session_token()?;
        let request = self
            .request(Method::POST, &["projects", project.as_str(), "stacks"], Some(token))?
            .json(composition);
        self.send_json(request).map_err(|e| match e {
            StackctlError::Api { message, .. } => StackctlError::Submission { message },
            other => other,
        })
    }

    /// Deletes a stack from the session's project.
    ///
    /// # Errors
    ///
    /// Returns an API error if the stack does not exist.
    pub fn delete_stack(&self, stack: &StackId) -> Result<()> {
        let project = self.session.project()?;
        let token = self.session_token()?;
        let request = self.request(
            Method::DELETE,
            &["projects", project.as_str(), "stacks", stack.as_str()],
            Some(token),
        )?;
        let _ = self.send(request)?;
        Ok(())
    }

    /// Creates a volume in the session's project.
    ///
    /// # Errors
    ///
    /// Returns an API error if the server rejects the volume.
    pub fn add_volume(&self, volume: &Volume) -> Result<Volume> {
        let project = self.session.project()?;
        let token = self.session_token()?;
        let request = self
            .request(Method::POST, &["projects", project.as_str(), "volumes"], Some(token))?
            .json(volume);
        self.send_json(request)
    }

    /// Fetches a volume from the session's project.
    ///
    /// # Errors
    ///
    /// Returns `StackctlError::NotFound` if there is no such volume.
    pub fn get_volume(&self, id: &str) -> Result<Volume> {
        let request = self.volume_request(Method::GET, id)?;
        self.send_json(request).map_err(|e| match e {
            StackctlError::Api { status: 404, .. } => StackctlError::NotFound {
                kind: "volume",
                id: id.to_string(),
            },
            other => other,
        })
    }

    /// Replaces a volume's stored record.
    ///
    /// # Errors
    ///
    /// Returns an API error if the update is rejected.
    pub fn update_volume(&self, volume: &Volume) -> Result<Volume> {
        let request = self.volume_request(Method::PUT, &volume.id)?.json(volume);
        self.send_json(request)
    }

    /// Deletes a volume from the session's project.
    ///
    /// # Errors
    ///
    /// Returns an API error if the volume does not exist.
    pub fn delete_volume(&self, id: &str) -> Result<()> {
        let request = self.volume_request(Method::DELETE, id)?;
        let _ = self.send(request)?;
        Ok(())
    }

    fn volume_request(&self, method: Method, id: &str) -> Result<RequestBuilder> {
        let project = self.session.project()?;
        let token = self.session_token()?;
        self.request(method, &["projects", project.as_str(), "volumes", id], Some(token))
    }

    fn session_token(&self) -> Result<&str> {
        self.session.token().ok_or(StackctlError::NotAuthenticated)
    }

    fn request(
        &self,
        method: Method,
        segments: &[&str],
        token: Option<&str>,
    ) -> Result<RequestBuilder> {
        let url = self.session.endpoint(segments)?;
        tracing::debug!(%method, %url, "api request");
        let builder = self.http.request(method, url);
        Ok(match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    #[allow(clippy::unused_self)]
    fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().map_err(transport)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().unwrap_or_default();
        tracing::debug!(status = status.as_u16(), "api request failed");
        Err(status_error(status, &body))
    }

    fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        self.send(request)?.json().map_err(transport)
    }
}

impl CatalogLookup for ApiClient {
    fn get_service(&self, key: &ServiceKey) -> Result<ServiceDefinition> {
        let request = self.request(Method::GET, &["services", key.as_str()], self.session.token())?;
        self.send_json(request).map_err(|e| unknown_on_not_found(e, key))
    }
}

impl StackSubmission for ApiClient {
    fn submit(&self, project: &ProjectId, composition: StackComposition) -> Result<PersistedStack> {
        self.add_stack(project, &composition)
    }
}

/// Converts a non-success response into an error.
///
/// The response body is used as the message when it has one; otherwise the
/// status reason phrase is used.
pub fn status_error(status: StatusCode, body: &str) -> StackctlError {
    let message = error_message(body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("unexpected response")
            .to_string()
    });
    StackctlError::Api {
        status: status.as_u16(),
        message,
    }
}

/// Extracts a readable message from an error body.
///
/// JSON bodies of the form `{"error": "..."}` or `{"message": "..."}` yield
/// the inner string; other non-blank bodies are returned trimmed.
fn error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(trimmed) {
        for field in ["error", "message"] {
            if let Some(serde_json::Value::String(msg)) = map.get(field) {
                return Some(msg.clone());
            }
        }
    }
    Some(trimmed.to_string())
}

fn unknown_on_not_found(err: StackctlError, key: &ServiceKey) -> StackctlError {
    match err {
        StackctlError::Api { status: 404, .. } => StackctlError::UnknownService {
            key: key.to_string(),
        },
        other => other,
    }
}

#[allow(clippy::needless_pass_by_value)]
fn transport(err: reqwest::Error) -> StackctlError {
    StackctlError::Transport {
        message: err.to_string(),
    }
}
