//! Unified error types for the stackctl workspace.
//!
//! The resolver, the API client, and the credential cache all report through
//! [`StackctlError`]; the CLI converts it into a single-line message.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum StackctlError {
    /// A referenced service key has no catalog entry.
    #[error("unknown service: {key}")]
    UnknownService {
        /// The key that could not be resolved.
        key: String,
    },

    /// The remote system rejected a composed stack.
    #[error("stack submission rejected: {message}")]
    Submission {
        /// Message returned by the remote system, verbatim.
        message: String,
    },

    /// The remote API answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body or reason phrase.
        message: String,
    },

    /// The request never produced a response.
    #[error("transport error: {message}")]
    Transport {
        /// Description of the transport failure.
        message: String,
    },

    /// No cached credentials are available.
    #[error("not logged in; run `stackctl login` first")]
    NotAuthenticated,

    /// A command argument is malformed.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of the problem.
        message: String,
    },

    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A configuration value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// A required resource was not found.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Type of the missing resource.
        kind: &'static str,
        /// Identifier of the missing resource.
        id: String,
    },

    /// Serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, StackctlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_service_names_the_key() {
        let err = StackctlError::UnknownService {
            key: "missing".into(),
        };
        assert_eq!(err.to_string(), "unknown service: missing");
    }

    #[test]
    fn submission_error_is_verbatim() {
        let err = StackctlError::Submission {
            message: "stack name already in use".into(),
        };
        assert!(err.to_string().ends_with("stack name already in use"));
    }

    #[test]
    fn serde_errors_convert() {
        let source = serde_json::from_str::<u32>("nope").unwrap_err();
        let err: StackctlError = source.into();
        assert!(matches!(err, StackctlError::Serialization { .. }));
    }
}
