#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Static Identity Plugin
//!
//! Identity plugin for the `docker_auth` module backed by a user directory
//! read from configuration. Passwords are stored as salted Argon2 hashes in
//! PHC string format (`regauth-server hash-password` prints one).
//!
//! ## Configuration
//!
//! ```yaml
//! static_identity:
//!   vendor: "hyperspot"
//!   priority: 100
//!   realm: docker
//!   users:
//!     - username: alice
//!       email: alice@example.com
//!       password_hash: "$argon2id$v=19$m=19456,t=2,p=1$..."
//!       groups: ["/registry-team"]
//!       client_roles:
//!         registry.example.com: [editor]
//! ```

pub mod config;
pub mod domain;
pub mod module;

pub use config::StaticIdentityPluginConfig;
pub use domain::HashError;
pub use domain::password::hash_password;
pub use module::StaticIdentityPlugin;
