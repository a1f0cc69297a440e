//! Service implementation for the static identity plugin.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use arc_swap::ArcSwap;
use docker_auth_sdk::{Credentials, DockerAuthError};
use regauth_security::SecurityContext;
use secrecy::ExposeSecret;
use uuid::Uuid;

use crate::config::{StaticIdentityPluginConfig, UserConfig};
use argon2::password_hash::PasswordHashString;

use crate::domain::error::ConfigError;
use crate::domain::password;

/// Message of every authentication failure.
pub const INVALID_CREDENTIALS: &str = "invalid username or password";

struct Directory {
    realm: String,
    users: HashMap<String, UserEntry>,
}

struct UserEntry {
    subject_id: Uuid,
    email: Option<String>,
    password_hash: PasswordHashString,
    enabled: bool,
    groups: BTreeSet<String>,
    client_roles: HashMap<String, BTreeSet<String>>,
}

/// Static identity service.
pub struct Service {
    directory: ArcSwap<Directory>,
}

impl Service {
    /// Create a service from plugin configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for an empty realm, empty or duplicate
    /// usernames, and password hashes that are not Argon2 PHC strings.
    pub fn from_config(cfg: &StaticIdentityPluginConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            directory: ArcSwap::from_pointee(Directory::build(cfg)?),
        })
    }

    /// Replace the user directory. On error the current directory stays active.
    ///
    /// # Errors
    ///
    /// See [`Service::from_config`].
    pub fn reload(&self, cfg: &StaticIdentityPluginConfig) -> Result<(), ConfigError> {
        let directory = Directory::build(cfg)?;
        self.directory.store(Arc::new(directory));
        tracing::info!(users = cfg.users.len(), "User directory reloaded");
        Ok(())
    }

    /// Number of users in the current directory.
    #[must_use]
    pub fn user_count(&self) -> usize {
        self.directory.load().users.len()
    }

    /// Verify `credentials` and build the security context for `client_id`.
    ///
    /// # Errors
    ///
    /// `Unauthorized` with [`INVALID_CREDENTIALS`] for an unknown realm, an
    /// unknown or disabled user and a wrong password.
    #[tracing::instrument(skip_all, fields(realm = %realm, client_id = %client_id, username = %credentials.username))]
    pub fn authenticate(
        &self,
        realm: &str,
        client_id: &str,
        credentials: &Credentials,
    ) -> Result<SecurityContext, DockerAuthError> {
        let directory = self.directory.load();
        let user = directory.users.get(&credentials.username);

        // Unknown users are verified against a fixed hash to keep the timing.
        let password_ok = password::verify(
            credentials.password.expose_secret(),
            user.map(|u| &u.password_hash),
        );

        let reject = |reason: &str| {
            tracing::debug!(reason, "Authentication rejected");
            Err(DockerAuthError::Unauthorized(INVALID_CREDENTIALS.to_owned()))
        };

        if realm != directory.realm {
            return reject("unknown realm");
        }
        let Some(user) = user else {
            return reject("unknown user");
        };
        if !password_ok {
            return reject("password mismatch");
        }
        if !user.enabled {
            return reject("user disabled");
        }

        let roles = user
            .client_roles
            .get(client_id)
            .map(|r| r.iter().map(String::as_str).collect::<Vec<_>>())
            .unwrap_or_default();

        Ok(SecurityContext::builder()
            .subject_id(user.subject_id)
            .username(&credentials.username)
            .email(user.email.as_deref())
            .realm(realm)
            .client_id(client_id)
            .client_roles(roles)
            .groups(user.groups.iter().map(String::as_str))
            .build())
    }
}

impl Directory {
    fn build(cfg: &StaticIdentityPluginConfig) -> Result<Self, ConfigError> {
        if cfg.realm.is_empty() {
            return Err(ConfigError::EmptyRealm);
        }

        let mut users = HashMap::with_capacity(cfg.users.len());
        for (index, user) in cfg.users.iter().enumerate() {
            if user.username.is_empty() {
                return Err(ConfigError::EmptyUsername(index));
            }
            let entry = UserEntry::build(&cfg.realm, user)?;
            if users.insert(user.username.clone(), entry).is_some() {
                return Err(ConfigError::DuplicateUser(user.username.clone()));
            }
        }

        Ok(Self {
            realm: cfg.realm.clone(),
            users,
        })
    }
}

impl UserEntry {
    fn build(realm: &str, cfg: &UserConfig) -> Result<Self, ConfigError> {
        let password_hash = password::parse(&cfg.password_hash).ok_or_else(|| {
            ConfigError::InvalidPasswordHash {
                username: cfg.username.clone(),
            }
        })?;

        Ok(Self {
            subject_id: cfg
                .subject_id
                .unwrap_or_else(|| derive_subject_id(realm, &cfg.username)),
            email: cfg.email.clone(),
            password_hash,
            enabled: cfg.enabled,
            groups: cfg.groups.iter().cloned().collect(),
            client_roles: cfg
                .client_roles
                .iter()
                .map(|(client, roles)| (client.clone(), roles.iter().cloned().collect()))
                .collect(),
        })
    }
}

/// Stable subject ID for users without a configured one.
#[must_use]
pub fn derive_subject_id(realm: &str, username: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, format!("regauth:{realm}/{username}").as_bytes())
}
