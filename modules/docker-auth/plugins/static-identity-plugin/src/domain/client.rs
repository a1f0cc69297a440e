//! Client implementation for the static identity plugin.

use async_trait::async_trait;
use docker_auth_sdk::{Credentials, DockerAuthError, IdentityPluginClient};
use regauth_security::SecurityContext;

use super::service::Service;

#[async_trait]
impl IdentityPluginClient for Service {
    async fn authenticate(
        &self,
        realm: &str,
        client_id: &str,
        credentials: &Credentials,
    ) -> Result<SecurityContext, DockerAuthError> {
        Service::authenticate(self, realm, client_id, credentials)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::config::{StaticIdentityPluginConfig, UserConfig};
    use crate::domain::password::hash_password;

    #[tokio::test]
    async fn plugin_trait_authenticates() {
        let service = Service::from_config(&StaticIdentityPluginConfig {
            users: vec![UserConfig {
                username: "alice".to_owned(),
                email: None,
                password_hash: hash_password("pw").unwrap(),
                enabled: true,
                groups: vec![],
                client_roles: std::collections::BTreeMap::new(),
                subject_id: None,
            }],
            ..StaticIdentityPluginConfig::default()
        })
        .unwrap();
        let plugin: &dyn IdentityPluginClient = &service;

        let ctx = plugin
            .authenticate("docker", "registry.local", &Credentials::new("alice", "pw"))
            .await
            .unwrap();
        assert_eq!(ctx.username(), "alice");

        let err = plugin
            .authenticate("docker", "registry.local", &Credentials::new("alice", "nope"))
            .await;
        assert!(matches!(err, Err(DockerAuthError::Unauthorized(_))));
    }
}
