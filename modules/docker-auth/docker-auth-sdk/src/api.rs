//! Public API trait for the `docker_auth` module.

use async_trait::async_trait;

use crate::error::DockerAuthError;
use crate::models::{TokenRequest, TokenResponse};

/// Public API of the token service.
///
/// Implemented by the `docker_auth` module and consumed by the HTTP layer (or any
/// other front end that speaks the Docker token protocol).
#[async_trait]
pub trait DockerAuthClient: Send + Sync {
    /// Authenticate the caller and issue a signed registry token.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` if credentials are missing or rejected
    /// - `InvalidRequest` for an unknown service, realm mismatch or account mismatch
    /// - `NoPluginAvailable` / `ServiceUnavailable` if a plugin cannot be resolved
    /// - `Internal` for signing failures
    async fn issue_token(&self, request: TokenRequest) -> Result<TokenResponse, DockerAuthError>;
}
