//! Configuration for the static identity plugin.

use std::collections::BTreeMap;

use regauth_security::constants::DEFAULT_REALM;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Plugin configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StaticIdentityPluginConfig {
    /// Vendor name used for plugin selection.
    pub vendor: String,

    /// Plugin priority (lower = higher priority).
    pub priority: i16,

    /// Realm the directory belongs to.
    pub realm: String,

    /// Known users.
    pub users: Vec<UserConfig>,
}

impl Default for StaticIdentityPluginConfig {
    fn default() -> Self {
        Self {
            vendor: "hyperspot".to_owned(),
            priority: 100,
            realm: DEFAULT_REALM.to_owned(),
            users: Vec::new(),
        }
    }
}

/// A user of the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserConfig {
    pub username: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Argon2 PHC string of the password, e.g. `$argon2id$v=19$...`.
    pub password_hash: String,

    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Realm group paths, e.g. `/registry-team`.
    #[serde(default)]
    pub groups: Vec<String>,

    /// Client roles keyed by client ID (the registry `service`).
    #[serde(default)]
    pub client_roles: BTreeMap<String, Vec<String>>,

    /// Fixed subject ID. Derived from realm and username when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<Uuid>,
}

fn default_enabled() -> bool {
    true
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn user_defaults() {
        let user: UserConfig = serde_json::from_value(serde_json::json!({
            "username": "alice",
            "password_hash": "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA"
        }))
        .unwrap();

        assert!(user.enabled);
        assert!(user.groups.is_empty());
        assert!(user.client_roles.is_empty());
        assert!(user.subject_id.is_none());
    }

    #[test]
    fn plain_password_field_is_rejected() {
        let res = serde_json::from_value::<UserConfig>(serde_json::json!({
            "username": "alice",
            "password": "secret"
        }));
        assert!(res.is_err());
    }

    #[test]
    fn default_realm() {
        assert_eq!(StaticIdentityPluginConfig::default().realm, "docker");
    }
}
