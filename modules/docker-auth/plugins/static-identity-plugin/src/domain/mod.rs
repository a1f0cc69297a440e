//! Domain layer for the static identity plugin.

mod client;
pub mod error;
pub mod password;
pub mod service;

pub use error::{ConfigError, HashError};
pub use service::Service;
