//! Wiring of the token module with its plugins, HTTP serving and hot reload.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use arc_swap::ArcSwap;
use docker_auth::DockerAuth;
use docker_auth_sdk::{AccessMapperPluginClient, IdentityPluginClient, PluginRegistry};
use group_role_mapper_plugin::GroupRoleMapperPlugin;
use static_identity_plugin::StaticIdentityPlugin;
use tracing::{error, info, warn};

use crate::config::AppConfig;

/// Running set of modules built from one configuration.
pub struct Runtime {
    docker_auth: DockerAuth,
    mapper: GroupRoleMapperPlugin,
    identity: StaticIdentityPlugin,
    /// Last configuration handed to [`Runtime::build`] or [`Runtime::reload`].
    applied: ArcSwap<AppConfig>,
}

impl Runtime {
    /// Initialize the plugins, register them and build the token module.
    ///
    /// # Errors
    ///
    /// Fails on any invalid plugin configuration, signing key error or missing plugin,
    /// and when the user directory realm differs from the token realm.
    pub fn build(cfg: &AppConfig) -> anyhow::Result<Self> {
        check_realms(cfg)?;

        let mut identities: PluginRegistry<dyn IdentityPluginClient> = PluginRegistry::new();
        let identity = StaticIdentityPlugin::init(&cfg.static_identity)?;
        identity.register(&mut identities)?;

        let mut mappers: PluginRegistry<dyn AccessMapperPluginClient> = PluginRegistry::new();
        let mapper = GroupRoleMapperPlugin::init(&cfg.group_role_mapper)?;
        mapper.register(&mut mappers)?;

        let docker_auth = DockerAuth::init(&cfg.docker_auth, &identities, &mappers)?;

        Ok(Self {
            docker_auth,
            mapper,
            identity,
            applied: ArcSwap::from_pointee(cfg.clone()),
        })
    }

    #[must_use]
    pub fn docker_auth(&self) -> &DockerAuth {
        &self.docker_auth
    }

    #[must_use]
    pub fn identity(&self) -> &StaticIdentityPlugin {
        &self.identity
    }

    #[must_use]
    pub fn mapper(&self) -> &GroupRoleMapperPlugin {
        &self.mapper
    }

    /// Apply the plugin sections of `cfg`. Each plugin keeps its previous
    /// state when its new section is invalid.
    ///
    /// # Errors
    ///
    /// Returns the first plugin reload failure.
    pub fn reload(&self, cfg: &AppConfig) -> anyhow::Result<()> {
        let previous = self.applied.swap(Arc::new(cfg.clone()));
        if section_changed(&previous.docker_auth, &cfg.docker_auth)
            || section_changed(&previous.server, &cfg.server)
        {
            warn!("Changes to 'server' and 'docker_auth' require a restart; ignoring them");
        }

        let token_realm = self.docker_auth.service().realm();
        let identity = if cfg.static_identity.realm == token_realm {
            self.identity
                .reload(&cfg.static_identity)
                .context("static_identity reload failed")
        } else {
            Err(anyhow::anyhow!(
                "static_identity reload failed: realm '{}' differs from the running realm '{token_realm}'",
                cfg.static_identity.realm
            ))
        };
        if let Err(e) = &identity {
            error!(error = %format!("{e:#}"), "Keeping previous user directory");
        }

        let mapper = self
            .mapper
            .reload(&cfg.group_role_mapper)
            .context("group_role_mapper reload failed");
        if let Err(e) = &mapper {
            error!(error = %format!("{e:#}"), "Keeping previous mapping rules");
        }

        identity.and(mapper)
    }
}

fn check_realms(cfg: &AppConfig) -> anyhow::Result<()> {
    anyhow::ensure!(
        cfg.static_identity.realm == cfg.docker_auth.realm,
        "static_identity.realm '{}' must equal docker_auth.realm '{}'",
        cfg.static_identity.realm,
        cfg.docker_auth.realm
    );
    Ok(())
}

fn section_changed<T: serde::Serialize>(old: &T, new: &T) -> bool {
    match (serde_json::to_value(old), serde_json::to_value(new)) {
        (Ok(old), Ok(new)) => old != new,
        _ => true,
    }
}

/// Serve HTTP until Ctrl-C or SIGTERM, reloading plugins on SIGHUP.
///
/// # Errors
///
/// Fails when the runtime cannot be built or the listener cannot bind.
pub async fn serve(cfg: AppConfig, config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let runtime = Arc::new(Runtime::build(&cfg)?);
    let router = runtime.docker_auth().router();
    info!(
        identity = %runtime.identity().instance().id,
        mapper = %runtime.mapper().instance().id,
        users = runtime.identity().service().user_count(),
        "Plugins ready"
    );

    spawn_reload_listener(runtime, config_path);

    let listener = tokio::net::TcpListener::bind(cfg.server.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", cfg.server.bind_addr))?;
    info!(addr = %cfg.server.bind_addr, "Token server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Token server stopped");
    Ok(())
}

/// Re-read the configuration and apply it to `runtime`.
///
/// # Errors
///
/// Fails when the configuration cannot be loaded or a plugin rejects it.
#[cfg_attr(not(unix), allow(dead_code))]
pub fn reload_from(runtime: &Runtime, config_path: Option<&Path>) -> anyhow::Result<()> {
    let cfg = AppConfig::load(config_path)?;
    runtime.reload(&cfg)
}

#[cfg(unix)]
fn spawn_reload_listener(runtime: Arc<Runtime>, config_path: Option<PathBuf>) {
    use tokio::signal::unix::{SignalKind, signal};

    let mut hangup = match signal(SignalKind::hangup()) {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %e, "SIGHUP handler unavailable; hot reload disabled");
            return;
        }
    };

    tokio::spawn(async move {
        while hangup.recv().await.is_some() {
            info!("SIGHUP received, reloading configuration");
            match reload_from(&runtime, config_path.as_deref()) {
                Ok(()) => info!("Configuration reloaded"),
                Err(e) => error!(error = %format!("{e:#}"), "Configuration reload failed"),
            }
        }
    });
}

#[cfg(not(unix))]
fn spawn_reload_listener(_runtime: Arc<Runtime>, _config_path: Option<PathBuf>) {}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl-C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("Shutdown signal received");
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use static_identity_plugin::hash_password;

    fn config() -> AppConfig {
        serde_json::from_value(serde_json::json!({
            "docker_auth": {
                "clients": ["registry.example.com"],
                "signing": {"algorithm": "HS256", "secret": "s3cret"}
            },
            "static_identity": {
                "users": [
                    {"username": "alice", "password_hash": hash_password("pw").unwrap()},
                    {"username": "bob", "password_hash": hash_password("pw").unwrap()}
                ]
            }
        }))
        .unwrap()
    }

    #[test]
    fn builds_from_config() {
        let runtime = Runtime::build(&config()).unwrap();
        assert_eq!(runtime.identity().service().user_count(), 2);
        assert_eq!(runtime.docker_auth().service().realm(), "docker");
    }

    #[test]
    fn missing_signing_secret_fails_build() {
        let mut cfg = config();
        cfg.docker_auth.signing.secret = None;
        assert!(Runtime::build(&cfg).is_err());
    }

    #[test]
    fn reload_applies_valid_sections_and_keeps_invalid_ones() {
        let runtime = Runtime::build(&config()).unwrap();

        let mut next = config();
        next.static_identity.users.truncate(1);
        runtime.reload(&next).unwrap();
        assert_eq!(runtime.identity().service().user_count(), 1);

        let mut broken = config();
        broken.static_identity.users[0].password_hash = "nope".to_owned();
        broken.group_role_mapper.group_prefix = "reg-".to_owned();
        assert!(runtime.reload(&broken).is_err());
        assert_eq!(runtime.identity().service().user_count(), 1);
        assert_eq!(runtime.mapper().service().rule_set().group_prefix(), "reg-");
    }

    #[test]
    fn mismatched_realms_fail_build() {
        let mut cfg = config();
        cfg.static_identity.realm = "staff".to_owned();

        let err = Runtime::build(&cfg).err().unwrap();
        assert!(format!("{err:#}").contains("must equal docker_auth.realm"), "{err:#}");
    }

    #[test]
    fn reload_remembers_restart_only_sections() {
        let runtime = Runtime::build(&config()).unwrap();

        let mut next = config();
        next.docker_auth.issuer = "https://auth.example.com".to_owned();
        runtime.reload(&next).unwrap();

        let applied = runtime.applied.load();
        assert!(!section_changed(&applied.docker_auth, &next.docker_auth));
        assert_eq!(runtime.docker_auth().service().realm(), "docker");
    }

    #[test]
    fn reload_rejects_directory_for_another_realm() {
        let runtime = Runtime::build(&config()).unwrap();

        let mut next = config();
        next.static_identity.realm = "staff".to_owned();
        next.static_identity.users.truncate(1);
        assert!(runtime.reload(&next).is_err());
        assert_eq!(runtime.identity().service().user_count(), 2);
    }
}
