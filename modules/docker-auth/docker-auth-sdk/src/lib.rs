#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Docker Auth SDK
//!
//! This crate provides the public API for the `docker_auth` module:
//!
//! - [`DockerAuthClient`] - Public API trait for consumers (token issuance)
//! - [`AccessMapperPluginClient`] - Plugin API trait for access mappers
//! - [`IdentityPluginClient`] - Plugin API trait for identity directories
//! - [`ResourceScope`], [`Action`] - Docker Registry v2 scope model
//! - [`AccessGrant`], [`MappingRequest`], [`MappingResponse`] - Mapping models
//! - [`PluginRegistry`] - Vendor/priority based plugin selection
//! - [`DockerAuthError`] - Error types
//!
//! ## Usage
//!
//! ```ignore
//! use docker_auth_sdk::{DockerAuthClient, ResourceScope, TokenRequest};
//!
//! let scopes = docker_auth_sdk::parse_scopes(["repository:team/app:pull,push"])?;
//! let response = client
//!     .issue_token(TokenRequest {
//!         realm: "docker".to_owned(),
//!         service: "registry.example.com".to_owned(),
//!         scopes,
//!         account: None,
//!         credentials: Some(credentials),
//!     })
//!     .await?;
//! ```

pub mod api;
pub mod error;
pub mod models;
pub mod plugin_api;
pub mod registry;
pub mod scope;

pub use api::DockerAuthClient;
pub use error::{DockerAuthError, ScopeParseError};
pub use models::{
    AccessGrant, Credentials, MappingRequest, MappingResponse, TokenRequest, TokenResponse,
};
pub use plugin_api::{AccessMapperPluginClient, IdentityPluginClient};
pub use registry::{PluginInstance, PluginRegistry};
pub use scope::{Action, ActionSet, ResourceScope, parse_scopes};
