//! Configuration for the group/role mapper plugin.

use docker_auth_sdk::Action;
use docker_auth_sdk::scope::REPOSITORY;
use regauth_security::roles;
use serde::{Deserialize, Serialize};

/// Plugin configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GroupRoleMapperConfig {
    /// Vendor name used for plugin selection.
    pub vendor: String,

    /// Plugin priority (lower = higher priority).
    pub priority: i16,

    /// Names of the client roles carrying the built-in levels.
    pub roles: RoleNames,

    /// Prefix a group name must carry to contribute a namespace.
    pub group_prefix: String,

    /// Where the subject's namespaces come from.
    pub namespace_scopes: Vec<NamespaceScope>,

    /// Lowest role level allowed to list the registry catalog.
    pub catalog_audience: RoleLevel,

    /// Additional grants, unioned with the built-in policy.
    pub rules: Vec<MappingRuleConfig>,
}

impl Default for GroupRoleMapperConfig {
    fn default() -> Self {
        Self {
            vendor: "hyperspot".to_owned(),
            priority: 100,
            roles: RoleNames::default(),
            group_prefix: "registry-".to_owned(),
            namespace_scopes: vec![NamespaceScope::Group],
            catalog_audience: RoleLevel::Admin,
            rules: Vec::new(),
        }
    }
}

/// Client role names for each built-in level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RoleNames {
    pub admin: String,
    pub editor: String,
    pub user: String,
}

impl Default for RoleNames {
    fn default() -> Self {
        Self {
            admin: roles::ADMIN.to_owned(),
            editor: roles::EDITOR.to_owned(),
            user: roles::USER.to_owned(),
        }
    }
}

/// Source of a subject namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamespaceScope {
    /// Realm groups whose name starts with `group_prefix`.
    Group,
    /// Domain of the e-mail address (`example.com`).
    Domain,
    /// Second-level label of the e-mail domain (`example`).
    Sld,
    /// The username.
    Username,
}

/// Built-in role level, ordered `user < editor < admin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleLevel {
    User,
    Editor,
    Admin,
}

/// A custom mapping rule.
///
/// Exactly one of `role` and `group` must be set. `repository` is a glob over
/// resource names in which `*` does not cross `/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MappingRuleConfig {
    /// Glob over the subject's client roles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Glob over group paths (when starting with `/`) or group names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,

    /// Resource type the rule applies to.
    #[serde(rename = "type", default = "default_resource_type")]
    pub resource_type: String,

    /// Glob over resource names.
    #[serde(alias = "name")]
    pub repository: String,

    /// Actions granted on matching resources.
    pub actions: Vec<Action>,
}

fn default_resource_type() -> String {
    REPOSITORY.to_owned()
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let cfg: GroupRoleMapperConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, GroupRoleMapperConfig::default());
        assert_eq!(cfg.namespace_scopes, vec![NamespaceScope::Group]);
        assert_eq!(cfg.catalog_audience, RoleLevel::Admin);
    }

    #[test]
    fn rule_type_defaults_to_repository() {
        let cfg: GroupRoleMapperConfig = serde_json::from_value(serde_json::json!({
            "rules": [{"role": "ci", "repository": "mirror/*", "actions": ["pull"]}]
        }))
        .unwrap();

        assert_eq!(cfg.rules[0].resource_type, "repository");
        assert_eq!(cfg.rules[0].actions, vec![Action::Pull]);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = serde_json::from_value::<GroupRoleMapperConfig>(serde_json::json!({
            "group_prefx": "docker-"
        }));
        assert!(err.is_err());
    }

    #[test]
    fn role_levels_are_ordered() {
        assert!(RoleLevel::Admin > RoleLevel::Editor);
        assert!(RoleLevel::Editor > RoleLevel::User);
    }
}
