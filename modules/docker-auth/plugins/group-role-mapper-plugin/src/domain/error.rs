use thiserror::Error;

/// Rejected mapper configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("role names must be non-empty and distinct")]
    InvalidRoleNames,

    #[error("rule {index}: {reason}")]
    InvalidRule { index: usize, reason: String },

    #[error("rule {index}: invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        index: usize,
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}
