//! # stackctl-client
//!
//! Talks to the orchestration API on behalf of the CLI.
//!
//! - [`Session`](session::Session): server endpoint plus the logged-in user,
//!   passed explicitly to every client instead of living in global state.
//! - [`CredentialCache`](credentials::CredentialCache): file-backed store for
//!   the login token.
//! - [`ApiClient`](api::ApiClient): blocking REST client. It is the catalog
//!   lookup and stack submission backend for `stackctl-compose`.

pub mod api;
pub mod credentials;
pub mod models;
pub mod session;
