//! Plugin instance registry with vendor/priority selection.
//!
//! Plugins register an instance descriptor together with their client. The
//! `docker_auth` module asks the registry for the instance of its configured
//! vendor; among several instances of that vendor the lowest `priority` wins.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::DockerAuthError;

/// Descriptor of a registered plugin instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginInstance {
    /// Unique instance ID, e.g. `hyperspot.builtin.group_role_mapper.plugin.v1`.
    pub id: String,
    /// Vendor used for selection.
    pub vendor: String,
    /// Lower value = higher priority.
    pub priority: i16,
}

/// Registry of plugin clients of one kind (`T` is the plugin trait object).
pub struct PluginRegistry<T: ?Sized> {
    entries: Vec<(PluginInstance, Arc<T>)>,
}

impl<T: ?Sized> Default for PluginRegistry<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T: ?Sized> PluginRegistry<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin instance.
    ///
    /// # Errors
    ///
    /// Returns `Internal` if an instance with the same ID is already registered.
    pub fn register(&mut self, instance: PluginInstance, client: Arc<T>) -> Result<(), DockerAuthError> {
        if self.entries.iter().any(|(existing, _)| existing.id == instance.id) {
            return Err(DockerAuthError::Internal(format!(
                "plugin instance '{}' is already registered",
                instance.id
            )));
        }
        tracing::debug!(
            instance_id = %instance.id,
            vendor = %instance.vendor,
            priority = instance.priority,
            "Registered plugin instance"
        );
        self.entries.push((instance, client));
        Ok(())
    }

    /// Registered instance descriptors, in registration order.
    pub fn instances(&self) -> impl Iterator<Item = &PluginInstance> {
        self.entries.iter().map(|(instance, _)| instance)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Select the instance for `vendor` with the lowest priority value.
    ///
    /// Ties are resolved in favour of the instance registered first.
    ///
    /// # Errors
    ///
    /// Returns `NoPluginAvailable` if no instance of `vendor` is registered.
    pub fn select(&self, vendor: &str) -> Result<(&PluginInstance, Arc<T>), DockerAuthError> {
        let mut best: Option<&(PluginInstance, Arc<T>)> = None;

        for entry in &self.entries {
            if entry.0.vendor != vendor {
                continue;
            }
            match best {
                Some((current, _)) if current.priority <= entry.0.priority => {}
                _ => best = Some(entry),
            }
        }

        best.map(|(instance, client)| (instance, Arc::clone(client)))
            .ok_or(DockerAuthError::NoPluginAvailable)
    }
}
