//! Server configuration: YAML file overlaid with `REGAUTH__*` environment variables.

use std::net::SocketAddr;
use std::path::Path;

use anyhow::Context;
use docker_auth::DockerAuthConfig;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use group_role_mapper_plugin::GroupRoleMapperConfig;
use serde::{Deserialize, Serialize};
use static_identity_plugin::StaticIdentityPluginConfig;

pub const ENV_PREFIX: &str = "REGAUTH__";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub docker_auth: DockerAuthConfig,
    pub group_role_mapper: GroupRoleMapperConfig,
    pub static_identity: StaticIdentityPluginConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

impl AppConfig {
    /// Load defaults, then the YAML file (if any), then the environment.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be parsed or a value has the wrong shape.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            anyhow::ensure!(path.exists(), "config file {} not found", path.display());
            figment = figment.merge(Yaml::file(path));
        }
        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("invalid configuration")
    }
}
