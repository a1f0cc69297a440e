//! `docker_auth` module.

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use docker_auth_sdk::{
    AccessMapperPluginClient, DockerAuthClient, IdentityPluginClient, PluginRegistry,
};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::rest::routes;
use crate::config::DockerAuthConfig;
use crate::domain::token::TokenSigner;
use crate::domain::{DockerAuthLocalClient, Service};

/// `docker_auth` module.
///
/// This module:
/// 1. Loads the signing key
/// 2. Selects the identity and mapper plugins by vendor and priority
/// 3. Exposes the token service as a local client and as a REST router
pub struct DockerAuth {
    service: Arc<Service>,
    client: Arc<dyn DockerAuthClient>,
}

impl DockerAuth {
    pub const MODULE_NAME: &'static str = "docker-auth";

    /// Initialize the module from its configuration and the plugin registries.
    ///
    /// # Errors
    ///
    /// Fails on signing key errors, invalid settings and missing plugins.
    #[tracing::instrument(skip_all, fields(realm = %cfg.realm))]
    pub fn init(
        cfg: &DockerAuthConfig,
        identities: &PluginRegistry<dyn IdentityPluginClient>,
        mappers: &PluginRegistry<dyn AccessMapperPluginClient>,
    ) -> anyhow::Result<Self> {
        info!(
            issuer = %cfg.issuer,
            clients = ?cfg.clients,
            token_ttl_secs = cfg.token_ttl_secs,
            algorithm = cfg.signing.algorithm.as_str(),
            "Initializing {} module",
            Self::MODULE_NAME
        );

        let signer = TokenSigner::from_config(&cfg.signing).context("failed to load signing key")?;
        info!(kid = ?signer.kid(), "Signing key loaded");

        Self::with_signer(cfg, signer, identities, mappers)
    }

    /// Initialize the module with an already constructed signer.
    ///
    /// # Errors
    ///
    /// Fails on invalid settings and missing plugins.
    pub fn with_signer(
        cfg: &DockerAuthConfig,
        signer: TokenSigner,
        identities: &PluginRegistry<dyn IdentityPluginClient>,
        mappers: &PluginRegistry<dyn AccessMapperPluginClient>,
    ) -> anyhow::Result<Self> {
        let service = Arc::new(
            Service::new(cfg, signer, identities, mappers)
                .with_context(|| format!("failed to initialize {}", Self::MODULE_NAME))?,
        );
        let client: Arc<dyn DockerAuthClient> =
            Arc::new(DockerAuthLocalClient::new(service.clone()));

        info!("{} module initialized successfully", Self::MODULE_NAME);
        Ok(Self { service, client })
    }

    /// REST router with the token and health endpoints.
    pub fn router(&self) -> Router {
        routes::register_routes(Router::new(), self.service.clone()).layer(TraceLayer::new_for_http())
    }

    #[must_use]
    pub fn client(&self) -> Arc<dyn DockerAuthClient> {
        self.client.clone()
    }

    #[must_use]
    pub fn service(&self) -> &Arc<Service> {
        &self.service
    }
}
