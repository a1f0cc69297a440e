//! Group/role mapper plugin module.

use std::sync::Arc;

use anyhow::Context;
use docker_auth_sdk::{AccessMapperPluginClient, PluginInstance, PluginRegistry};
use tracing::{info, warn};

use crate::config::GroupRoleMapperConfig;
use crate::domain::Service;

/// Instance ID under which the plugin registers itself.
pub const INSTANCE_ID: &str = "hyperspot.builtin.group_role_mapper.plugin.v1";

/// Group/role mapper plugin module.
pub struct GroupRoleMapperPlugin {
    instance: PluginInstance,
    service: Arc<Service>,
}

impl GroupRoleMapperPlugin {
    /// Compile the configuration and create the plugin.
    ///
    /// # Errors
    ///
    /// Fails when the mapping configuration is invalid.
    pub fn init(cfg: &GroupRoleMapperConfig) -> anyhow::Result<Self> {
        info!("Initializing group_role_mapper_plugin");
        info!(
            vendor = %cfg.vendor,
            priority = cfg.priority,
            namespace_scopes = ?cfg.namespace_scopes,
            catalog_audience = ?cfg.catalog_audience,
            rules = cfg.rules.len(),
            "Loaded plugin configuration"
        );

        let service = Service::new(cfg).context("invalid group_role_mapper configuration")?;

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
        registry: &mut PluginRegistry<dyn AccessMapperPluginClient>,
    ) -> anyhow::Result<()> {
        let api: Arc<dyn AccessMapperPluginClient> = self.service.clone();
        registry.register(self.instance.clone(), api)?;
        info!(instance_id = %self.instance.id, "Group/role mapper plugin initialized");
        Ok(())
    }

    /// Apply a new configuration to the running plugin.
    ///
    /// Vendor and priority are fixed at registration; changes to them are
    /// ignored until restart.
    ///
    /// # Errors
    ///
    /// Fails when the new configuration is invalid; the previous rules stay active.
    pub fn reload(&self, cfg: &GroupRoleMapperConfig) -> anyhow::Result<()> {
        if cfg.vendor != self.instance.vendor || cfg.priority != self.instance.priority {
            warn!(
                instance_id = %self.instance.id,
                "Vendor/priority changes take effect after restart"
            );
        }
        self.service
            .reload(cfg)
            .context("invalid group_role_mapper configuration")
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
