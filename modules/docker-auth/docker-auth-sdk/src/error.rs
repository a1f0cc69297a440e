//! Error types for the `docker_auth` module.

use thiserror::Error;

/// Errors that can occur when using the `docker_auth` API or its plugins.
///
/// An empty grant set is not an error: a subject without access still
/// receives a token, only with fewer `access` entries.
#[derive(Debug, Error)]
pub enum DockerAuthError {
    /// Missing, unknown or rejected credentials.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The token request itself is malformed (bad scope, unknown service, ...).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// No plugin is registered for the configured vendor.
    #[error("no plugin available")]
    NoPluginAvailable,

    /// The plugin exists but cannot serve requests right now.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Errors produced while parsing a Docker scope string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScopeParseError {
    #[error("malformed scope '{0}', expected type:name:actions")]
    Malformed(String),

    #[error("invalid resource type '{0}'")]
    InvalidResourceType(String),

    #[error("invalid repository name '{0}'")]
    InvalidRepositoryName(String),

    #[error("unknown action '{0}'")]
    UnknownAction(String),
}

impl From<ScopeParseError> for DockerAuthError {
    fn from(e: ScopeParseError) -> Self {
        Self::InvalidRequest(e.to_string())
    }
}
