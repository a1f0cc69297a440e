//! Client implementation for the group/role mapper plugin.

use async_trait::async_trait;
use docker_auth_sdk::{
    AccessMapperPluginClient, DockerAuthError, MappingRequest, MappingResponse,
};

use super::service::Service;

#[async_trait]
impl AccessMapperPluginClient for Service {
    async fn map_access(&self, request: MappingRequest) -> Result<MappingResponse, DockerAuthError> {
        Ok(self.map(&request.security_context, &request.requested))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::config::GroupRoleMapperConfig;
    use docker_auth_sdk::ResourceScope;
    use regauth_security::SecurityContext;

    #[tokio::test]
    async fn plugin_trait_maps_successfully() {
        let service = Service::new(&GroupRoleMapperConfig::default()).unwrap();
        let plugin: &dyn AccessMapperPluginClient = &service;

        let request = MappingRequest {
            security_context: SecurityContext::builder()
                .username("alice")
                .client_roles(["user"])
                .groups(["/registry-team"])
                .build(),
            requested: vec![ResourceScope::parse("repository:team/app:pull,push").unwrap()],
        };

        let response = plugin.map_access(request).await.unwrap();
        assert_eq!(response.grants.len(), 1);
        assert_eq!(response.grants[0].name, "team/app");
    }
}
