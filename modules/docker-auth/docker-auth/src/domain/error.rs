//! Domain errors for the `docker_auth` module.

use docker_auth_sdk::{DockerAuthError, ScopeParseError};

/// Internal domain errors.
#[derive(thiserror::Error, Debug)]
pub enum DomainError {
    #[error("realm '{0}' does not exist")]
    UnknownRealm(String),

    #[error("unknown service '{0}'")]
    UnknownService(String),

    #[error("credentials required")]
    MissingCredentials,

    #[error("{0}")]
    Unauthorized(String),

    #[error("account '{account}' does not match the authenticated user")]
    AccountMismatch { account: String },

    #[error(transparent)]
    InvalidScope(#[from] ScopeParseError),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("no plugin instances found for vendor '{vendor}'")]
    PluginNotFound { vendor: String },

    #[error("plugin not available: {0}")]
    PluginUnavailable(String),

    #[error("signing key error: {0}")]
    SigningKey(String),

    #[error("token signing failed: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<DockerAuthError> for DomainError {
    fn from(e: DockerAuthError) -> Self {
        match e {
            DockerAuthError::Unauthorized(msg) => Self::Unauthorized(msg),
            DockerAuthError::InvalidRequest(msg) => Self::InvalidRequest(msg),
            DockerAuthError::NoPluginAvailable => Self::PluginNotFound {
                vendor: "unknown".to_owned(),
            },
            DockerAuthError::ServiceUnavailable(msg) => Self::PluginUnavailable(msg),
            DockerAuthError::Internal(msg) => Self::Internal(msg),
        }
    }
}

impl From<DomainError> for DockerAuthError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::MissingCredentials => Self::Unauthorized(e.to_string()),
            DomainError::Unauthorized(msg) => Self::Unauthorized(msg),
            DomainError::UnknownRealm(_)
            | DomainError::UnknownService(_)
            | DomainError::AccountMismatch { .. }
            | DomainError::InvalidScope(_) => Self::InvalidRequest(e.to_string()),
            DomainError::InvalidRequest(msg) => Self::InvalidRequest(msg),
            DomainError::PluginNotFound { .. } => Self::NoPluginAvailable,
            DomainError::PluginUnavailable(msg) => Self::ServiceUnavailable(msg),
            DomainError::SigningKey(_) | DomainError::Signing(_) => Self::Internal(e.to_string()),
            DomainError::Internal(msg) => Self::Internal(msg),
        }
    }
}
