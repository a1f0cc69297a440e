//! Static identity plugin module.

use std::sync::Arc;

use anyhow::Context;
use docker_auth_sdk::{IdentityPluginClient, PluginInstance, PluginRegistry};
use tracing::{info, warn};

use crate::config::StaticIdentityPluginConfig;
use crate::domain::Service;

/// Instance ID under which the plugin registers itself.
pub const INSTANCE_ID: &str = "hyperspot.builtin.static_identity.plugin.v1";

/// Static identity plugin module.
pub struct StaticIdentityPlugin {
    instance: PluginInstance,
    service: Arc<Service>,
}

impl StaticIdentityPlugin {
    /// Build the user directory and create the plugin.
    ///
    /// # Errors
    ///
    /// Fails when the user directory is invalid.
    pub fn init(cfg: &StaticIdentityPluginConfig) -> anyhow::Result<Self> {
        info!("Initializing static_identity_plugin");
        info!(
            vendor = %cfg.vendor,
            priority = cfg.priority,
            realm = %cfg.realm,
            users = cfg.users.len(),
            "Loaded plugin configuration"
        );
        if cfg.users.is_empty() {
            warn!("User directory is empty, every token request will be rejected");
        }

        let service =
            Service::from_config(cfg).context("invalid static_identity configuration")?;

        Ok(Self {
            instance: PluginInstance {
                id: INSTANCE_ID.to_owned(),
                vendor: cfg.vendor.clone(),
                priority: cfg.priority,
            },
            service: Arc::new(service),
        })
    }

    /// Register the plugin client in `registry`.
    ///
    /// # Errors
    ///
    /// Fails when an instance with the same ID is already registered.
    pub fn register(
        &self,
        registry: &mut PluginRegistry<dyn IdentityPluginClient>,
    ) -> anyhow::Result<()> {
        let api: Arc<dyn IdentityPluginClient> = self.service.clone();
        registry.register(self.instance.clone(), api)?;
        info!(instance_id = %self.instance.id, "Static identity plugin initialized");
        Ok(())
    }

    /// Apply a new user directory to the running plugin.
    ///
    /// # Errors
    ///
    /// Fails when the new directory is invalid; the previous one stays active.
    pub fn reload(&self, cfg: &StaticIdentityPluginConfig) -> anyhow::Result<()> {
        if cfg.vendor != self.instance.vendor || cfg.priority != self.instance.priority {
            warn!(
                instance_id = %self.instance.id,
                "Vendor/priority changes take effect after restart"
            );
        }
        self.service
            .reload(cfg)
            .context("invalid static_identity configuration")
    }

    #[must_use]
    pub fn instance(&self) -> &PluginInstance {
        &self.instance
    }

    #[must_use]
    pub fn service(&self) -> &Arc<Service> {
        &self.service
    }
}
