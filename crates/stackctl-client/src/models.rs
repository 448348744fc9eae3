//! Request and response bodies of the orchestration API that are not part of
//! the composition model.

use serde::{Deserialize, Serialize};

/// A project (user account) as managed by administrators.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Project identifier, also the login name.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Namespace the project's stacks run in.
    #[serde(default)]
    pub namespace: String,
    /// Login password.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub password: String,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Contact address.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub email_address: String,
    /// Storage quota in GB.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_quota: Option<u32>,
}

impl Project {
    /// Creates a project whose id, name, and namespace are all `name`.
    #[must_use]
    pub fn named(name: &str, password: &str) -> Self {
        Self {
            id: name.to_string(),
            name: name.to_string(),
            namespace: name.to_string(),
            password: password.to_string(),
            ..Self::default()
        }
    }
}

/// A storage volume, optionally attached to one stack service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    /// Identifier assigned by the server.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// Volume name.
    pub name: String,
    /// Size in `size_unit`.
    pub size: u32,
    /// Unit of `size`.
    pub size_unit: String,
    /// Stack service the volume is attached to; empty when detached.
    #[serde(default)]
    pub attached: String,
    /// Server-reported status.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub status: String,
}

impl Volume {
    /// Returns `true` if the volume is attached to a stack service.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        !self.attached.is_empty()
    }
}

/// Body of `POST /authenticate`.
#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Body returned by `POST /authenticate` and `GET /refresh_token`.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub token: String,
}
