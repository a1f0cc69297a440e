//! Domain layer for the group/role mapper plugin.

mod client;
pub mod error;
pub mod extractor;
pub mod rules;
pub mod service;

pub use error::ConfigError;
pub use extractor::Subject;
pub use rules::RuleSet;
pub use service::Service;
