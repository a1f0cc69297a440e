//! Domain service for the `docker_auth` module.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use docker_auth_sdk::{
    AccessMapperPluginClient, IdentityPluginClient, MappingRequest, PluginInstance,
    PluginRegistry, TokenRequest, TokenResponse,
};
use tracing::info;

use super::error::DomainError;
use super::token::{Claims, TokenSigner};
use crate::config::DockerAuthConfig;

/// Token service: authenticates, maps access and signs registry tokens.
pub struct Service {
    realm: String,
    issuer: String,
    clients: BTreeSet<String>,
    ttl_secs: u64,
    identity: Arc<dyn IdentityPluginClient>,
    mapper: Arc<dyn AccessMapperPluginClient>,
    signer: TokenSigner,
}

impl Service {
    /// Build the service, selecting the identity and mapper plugins by vendor.
    ///
    /// # Errors
    ///
    /// - `InvalidRequest` when `token_ttl_secs` is zero or no client is configured
    /// - `PluginNotFound` when a configured vendor has no registered plugin
    pub fn new(
        cfg: &DockerAuthConfig,
        signer: TokenSigner,
        identities: &PluginRegistry<dyn IdentityPluginClient>,
        mappers: &PluginRegistry<dyn AccessMapperPluginClient>,
    ) -> Result<Self, DomainError> {
        if cfg.token_ttl_secs == 0 {
            return Err(DomainError::InvalidRequest(
                "token_ttl_secs must be greater than zero".to_owned(),
            ));
        }
        if cfg.clients.is_empty() {
            return Err(DomainError::InvalidRequest(
                "at least one client (registry service) must be configured".to_owned(),
            ));
        }

        let identity = choose_plugin("identity", &cfg.identity_vendor, identities)?;
        let mapper = choose_plugin("mapper", &cfg.mapper_vendor, mappers)?;

        Ok(Self {
            realm: cfg.realm.clone(),
            issuer: cfg.issuer.clone(),
            clients: cfg.clients.iter().cloned().collect(),
            ttl_secs: cfg.token_ttl_secs,
            identity,
            mapper,
            signer,
        })
    }

    #[must_use]
    pub fn realm(&self) -> &str {
        &self.realm
    }

    /// Issue a registry token.
    ///
    /// # Errors
    ///
    /// - `UnknownRealm`, `UnknownService` for requests this instance does not serve
    /// - `MissingCredentials` / `Unauthorized` when authentication fails
    /// - `AccountMismatch` when `account` names another user
    /// - plugin and signing errors
    #[tracing::instrument(skip_all, fields(realm = %request.realm, service = %request.service, scopes = request.scopes.len()))]
    pub async fn issue_token(&self, request: TokenRequest) -> Result<TokenResponse, DomainError> {
        if request.realm != self.realm {
            return Err(DomainError::UnknownRealm(request.realm));
        }
        if !self.clients.contains(&request.service) {
            return Err(DomainError::UnknownService(request.service));
        }
        let credentials = request
            .credentials
            .as_ref()
            .ok_or(DomainError::MissingCredentials)?;

        let ctx = self
            .identity
            .authenticate(&self.realm, &request.service, credentials)
            .await?;

        if let Some(account) = request.account.as_deref().filter(|a| !a.is_empty())
            && account != ctx.username()
        {
            return Err(DomainError::AccountMismatch {
                account: account.to_owned(),
            });
        }

        let username = ctx.username().to_owned();
        let mapping = self
            .mapper
            .map_access(MappingRequest {
                security_context: ctx,
                requested: request.scopes,
            })
            .await?;

        let now = Utc::now();
        let granted = mapping.grants.len();
        let claims = Claims::new(
            &self.issuer,
            &username,
            &request.service,
            now,
            self.ttl_secs,
            mapping.grants,
        );
        let token = self.signer.sign(&claims)?;

        info!(username = %username, granted, jti = %claims.jti, "Issued registry token");

        Ok(TokenResponse {
            access_token: token.clone(),
            token,
            expires_in: self.ttl_secs,
            issued_at: now.to_rfc3339_opts(SecondsFormat::Secs, true),
        })
    }
}

#[tracing::instrument(skip(registry), fields(instance_count = registry.instances().count()))]
fn choose_plugin<T: ?Sized>(
    kind: &str,
    vendor: &str,
    registry: &PluginRegistry<T>,
) -> Result<Arc<T>, DomainError> {
    let (instance, client): (&PluginInstance, Arc<T>) =
        registry.select(vendor).map_err(|_| DomainError::PluginNotFound {
            vendor: vendor.to_owned(),
        })?;
    info!(instance_id = %instance.id, priority = instance.priority, "Selected {kind} plugin instance");
    Ok(client)
}
