#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Group/Role Mapper Plugin
//!
//! Access mapper for the `docker_auth` module. Grants Docker Registry v2 scopes
//! from the client roles and realm group memberships of the authenticated subject.
//!
//! ## Built-in policy
//!
//! - `admin` → `pull,push,delete,*` on every repository
//! - `editor` → `pull,push` on repositories in one of the subject's namespaces
//! - `user` → `pull` on repositories in one of the subject's namespaces
//! - `registry:catalog:*` → subjects at or above `catalog_audience`
//!
//! A namespace is the first path component of a repository name. The subject's
//! namespaces come from the sources listed in `namespace_scopes`, e.g. the group
//! `/registry-team` yields the namespace `team`.
//!
//! ## Configuration
//!
//! ```yaml
//! group_role_mapper:
//!   vendor: "hyperspot"
//!   priority: 100
//!   roles:
//!     admin: admin
//!     editor: editor
//!     user: user
//!   group_prefix: "registry-"
//!   namespace_scopes: [group, username]
//!   catalog_audience: editor
//!   rules:
//!     - group: "/ci-*"
//!       repository: "mirror/*"
//!       actions: [pull, push]
//! ```

pub mod config;
pub mod domain;
pub mod module;

pub use config::GroupRoleMapperConfig;
pub use module::GroupRoleMapperPlugin;
