//! Plugin API traits implemented by `docker_auth` plugins.

use async_trait::async_trait;
use regauth_security::SecurityContext;

use crate::error::DockerAuthError;
use crate::models::{Credentials, MappingRequest, MappingResponse};

/// Maps an authenticated subject and its requested scopes to granted access.
///
/// Implementations must be pure with respect to their current configuration:
/// the same request always yields the same response, and no action is granted
/// unless it was requested.
#[async_trait]
pub trait AccessMapperPluginClient: Send + Sync {
    /// Compute the grants for one token request.
    ///
    /// # Errors
    ///
    /// - `Internal` for unexpected errors
    async fn map_access(&self, request: MappingRequest) -> Result<MappingResponse, DockerAuthError>;
}

/// Verifies credentials and builds the subject's [`SecurityContext`].
#[async_trait]
pub trait IdentityPluginClient: Send + Sync {
    /// Authenticate `credentials` in `realm` for the registry client `client_id`.
    ///
    /// The returned context carries only the client roles of `client_id`.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` for unknown realms, unknown or disabled users and wrong passwords
    /// - `Internal` for unexpected errors
    async fn authenticate(
        &self,
        realm: &str,
        client_id: &str,
        credentials: &Credentials,
    ) -> Result<SecurityContext, DockerAuthError>;
}
