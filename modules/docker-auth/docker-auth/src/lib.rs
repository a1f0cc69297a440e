#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Docker Auth Module
//!
//! Token service for Docker Registry v2 token authentication. A request is
//! authenticated by the selected identity plugin, its scopes are mapped by the
//! selected access mapper plugin, and the grants are signed into the `access`
//! claim of a registry bearer token.
//!
//! ## Endpoints
//!
//! - `GET /realms/{realm}/protocol/docker-v2/auth?service=..&scope=..&account=..`
//! - `GET /health`
//!
//! ## Configuration
//!
//! ```yaml
//! docker_auth:
//!   realm: docker
//!   issuer: "https://auth.example.com/realms/docker"
//!   clients: ["registry.example.com"]
//!   token_ttl_secs: 300
//!   mapper_vendor: "hyperspot"
//!   identity_vendor: "hyperspot"
//!   signing:
//!     algorithm: RS256
//!     private_key_path: /etc/regauth/token.key
//!     public_key_path: /etc/regauth/token.pub
//! ```

pub mod api;
pub mod config;
pub mod domain;
pub mod module;

pub use config::{DockerAuthConfig, SigningAlgorithm, SigningConfig};
pub use module::DockerAuth;
