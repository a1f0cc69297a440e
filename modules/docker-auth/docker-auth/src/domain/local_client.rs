//! Local (in-process) client for the `docker_auth` module.

use std::sync::Arc;

use async_trait::async_trait;
use docker_auth_sdk::{DockerAuthClient, DockerAuthError, TokenRequest, TokenResponse};

use super::{DomainError, Service};

/// Local client wrapping the service.
pub struct DockerAuthLocalClient {
    svc: Arc<Service>,
}

impl DockerAuthLocalClient {
    #[must_use]
    pub fn new(svc: Arc<Service>) -> Self {
        Self { svc }
    }
}

fn log_and_convert(op: &str, e: DomainError) -> DockerAuthError {
    match &e {
        DomainError::Internal(_) | DomainError::Signing(_) | DomainError::SigningKey(_) => {
            tracing::error!(operation = op, error = ?e, "docker_auth call failed");
        }
        _ => tracing::debug!(operation = op, error = %e, "docker_auth call rejected"),
    }
    e.into()
}

#[async_trait]
impl DockerAuthClient for DockerAuthLocalClient {
    async fn issue_token(&self, request: TokenRequest) -> Result<TokenResponse, DockerAuthError> {
        self.svc
            .issue_token(request)
            .await
            .map_err(|e| log_and_convert("issue_token", e))
    }
}
