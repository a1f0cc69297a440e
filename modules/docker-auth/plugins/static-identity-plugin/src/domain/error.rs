use thiserror::Error;

/// Rejected user directory configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("realm must not be empty")]
    EmptyRealm,

    #[error("user #{0} has an empty username")]
    EmptyUsername(usize),

    #[error("user '{0}' is defined more than once")]
    DuplicateUser(String),

    #[error("user '{username}': password_hash is not an Argon2 PHC string")]
    InvalidPasswordHash { username: String },
}

/// Failure to hash a new password.
#[derive(Debug, Error)]
pub enum HashError {
    #[error("no randomness for the salt: {0}")]
    Salt(getrandom::Error),

    #[error("argon2: {0}")]
    Argon2(argon2::password_hash::Error),
}
