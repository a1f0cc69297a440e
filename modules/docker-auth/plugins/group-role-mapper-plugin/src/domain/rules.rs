//! Compiled, immutable mapping configuration.

use std::collections::BTreeSet;

use docker_auth_sdk::{ActionSet, ResourceScope};
use glob::{MatchOptions, Pattern};
use regauth_security::SecurityContext;

use crate::config::{GroupRoleMapperConfig, MappingRuleConfig, NamespaceScope, RoleLevel, RoleNames};
use crate::domain::error::ConfigError;

/// `*` and `?` never match `/`.
const PATH_MATCH: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// The rule set a mapper instance evaluates requests against.
#[derive(Debug, Clone)]
pub struct RuleSet {
    roles: RoleNames,
    group_prefix: String,
    namespace_scopes: BTreeSet<NamespaceScope>,
    catalog_audience: RoleLevel,
    rules: Vec<MappingRule>,
}

impl RuleSet {
    /// Validate and compile a configuration.
    ///
    /// # Errors
    ///
    /// - `InvalidRoleNames` when a role name is empty or used for two levels
    /// - `InvalidRule` / `InvalidPattern` for the first rule that does not compile
    pub fn compile(cfg: &GroupRoleMapperConfig) -> Result<Self, ConfigError> {
        let names = [&cfg.roles.admin, &cfg.roles.editor, &cfg.roles.user];
        let distinct: BTreeSet<&str> = names.iter().map(|n| n.as_str()).collect();
        if names.iter().any(|n| n.is_empty()) || distinct.len() != names.len() {
            return Err(ConfigError::InvalidRoleNames);
        }

        let rules = cfg
            .rules
            .iter()
            .enumerate()
            .map(|(index, rule)| MappingRule::compile(index, rule))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            roles: cfg.roles.clone(),
            group_prefix: cfg.group_prefix.clone(),
            namespace_scopes: cfg.namespace_scopes.iter().copied().collect(),
            catalog_audience: cfg.catalog_audience,
            rules,
        })
    }

    #[must_use]
    pub fn roles(&self) -> &RoleNames {
        &self.roles
    }

    #[must_use]
    pub fn group_prefix(&self) -> &str {
        &self.group_prefix
    }

    #[must_use]
    pub fn uses(&self, source: NamespaceScope) -> bool {
        self.namespace_scopes.contains(&source)
    }

    #[must_use]
    pub fn catalog_audience(&self) -> RoleLevel {
        self.catalog_audience
    }

    #[must_use]
    pub fn rules(&self) -> &[MappingRule] {
        &self.rules
    }
}

/// A compiled custom rule.
#[derive(Debug, Clone)]
pub struct MappingRule {
    subject: RuleSubject,
    resource_type: String,
    resource: Pattern,
    actions: ActionSet,
}

#[derive(Debug, Clone)]
enum RuleSubject {
    Role(Pattern),
    GroupPath(Pattern),
    GroupName(Pattern),
}

impl MappingRule {
    fn compile(index: usize, cfg: &MappingRuleConfig) -> Result<Self, ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidRule {
            index,
            reason: reason.to_owned(),
        };
        let pattern = |raw: &str| {
            Pattern::new(raw).map_err(|source| ConfigError::InvalidPattern {
                index,
                pattern: raw.to_owned(),
                source,
            })
        };

        let subject = match (&cfg.role, &cfg.group) {
            (Some(role), None) => RuleSubject::Role(pattern(role)?),
            (None, Some(group)) if group.starts_with('/') => RuleSubject::GroupPath(pattern(group)?),
            (None, Some(group)) => RuleSubject::GroupName(pattern(group)?),
            _ => return Err(invalid("exactly one of 'role' and 'group' must be set")),
        };

        if cfg.resource_type.is_empty()
            || !cfg
                .resource_type
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        {
            return Err(invalid("'type' must match [a-z0-9]+"));
        }
        if cfg.repository.is_empty() {
            return Err(invalid("'repository' must not be empty"));
        }
        if cfg.actions.is_empty() {
            return Err(invalid("'actions' must not be empty"));
        }

        Ok(Self {
            subject,
            resource_type: cfg.resource_type.clone(),
            resource: pattern(&cfg.repository)?,
            actions: cfg.actions.iter().copied().collect(),
        })
    }

    /// Returns `true` when the rule grants something on `scope` to `ctx`.
    #[must_use]
    pub fn applies_to(&self, ctx: &SecurityContext, scope: &ResourceScope) -> bool {
        self.resource_type == scope.resource_type()
            && self.resource.matches_with(scope.name(), PATH_MATCH)
            && self.subject.matches(ctx)
    }

    #[must_use]
    pub fn actions(&self) -> &ActionSet {
        &self.actions
    }
}

impl RuleSubject {
    fn matches(&self, ctx: &SecurityContext) -> bool {
        match self {
            Self::Role(p) => ctx.client_roles().iter().any(|role| p.matches(role)),
            Self::GroupPath(p) => ctx.groups().iter().any(|path| p.matches_with(path, PATH_MATCH)),
            Self::GroupName(p) => ctx.groups().iter().any(|path| p.matches(group_name(path))),
        }
    }
}

/// Last segment of a group path: `/org/registry-team` → `registry-team`.
pub(crate) fn group_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use docker_auth_sdk::Action;

    fn rule(role: Option<&str>, group: Option<&str>, repository: &str) -> MappingRuleConfig {
        MappingRuleConfig {
            role: role.map(ToOwned::to_owned),
            group: group.map(ToOwned::to_owned),
            resource_type: "repository".to_owned(),
            repository: repository.to_owned(),
            actions: vec![Action::Pull],
        }
    }

    fn compile_one(rule: MappingRuleConfig) -> Result<RuleSet, ConfigError> {
        RuleSet::compile(&GroupRoleMapperConfig {
            rules: vec![rule],
            ..GroupRoleMapperConfig::default()
        })
    }

    #[test]
    fn default_config_compiles() {
        let rules = RuleSet::compile(&GroupRoleMapperConfig::default()).unwrap();
        assert!(rules.uses(NamespaceScope::Group));
        assert!(!rules.uses(NamespaceScope::Username));
        assert!(rules.rules().is_empty());
    }

    #[test]
    fn duplicate_role_names_are_rejected() {
        let mut cfg = GroupRoleMapperConfig::default();
        cfg.roles.editor = "admin".to_owned();
        assert!(matches!(
            RuleSet::compile(&cfg),
            Err(ConfigError::InvalidRoleNames)
        ));
    }

    #[test]
    fn rule_needs_exactly_one_subject() {
        assert!(matches!(
            compile_one(rule(None, None, "a/*")),
            Err(ConfigError::InvalidRule { index: 0, .. })
        ));
        assert!(matches!(
            compile_one(rule(Some("ci"), Some("ci"), "a/*")),
            Err(ConfigError::InvalidRule { index: 0, .. })
        ));
    }

    #[test]
    fn bad_glob_is_rejected() {
        assert!(matches!(
            compile_one(rule(Some("ci"), None, "a/[")),
            Err(ConfigError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn empty_actions_are_rejected() {
        let mut cfg = rule(Some("ci"), None, "a/*");
        cfg.actions.clear();
        assert!(matches!(
            compile_one(cfg),
            Err(ConfigError::InvalidRule { .. })
        ));
    }

    #[test]
    fn star_does_not_cross_path_separator() {
        let rules = compile_one(rule(Some("ci"), None, "mirror/*")).unwrap();
        let ctx = SecurityContext::builder().client_roles(["ci"]).build();

        let direct = ResourceScope::repository("mirror/alpine", [Action::Pull]);
        let nested = ResourceScope::repository("mirror/library/alpine", [Action::Pull]);

        assert!(rules.rules()[0].applies_to(&ctx, &direct));
        assert!(!rules.rules()[0].applies_to(&ctx, &nested));
    }

    #[test]
    fn group_patterns_match_paths_or_names() {
        let by_path = compile_one(rule(None, Some("/ops/*"), "infra/*")).unwrap();
        let by_name = compile_one(rule(None, Some("ci-*"), "infra/*")).unwrap();
        let ctx = SecurityContext::builder()
            .groups(["/ops/ci-runners"])
            .build();
        let scope = ResourceScope::repository("infra/tools", [Action::Pull]);

        assert!(by_path.rules()[0].applies_to(&ctx, &scope));
        assert!(by_name.rules()[0].applies_to(&ctx, &scope));
    }

    #[test]
    fn rule_type_must_match_scope_type() {
        let mut cfg = rule(Some("ci"), None, "catalog");
        cfg.resource_type = "registry".to_owned();
        let rules = compile_one(cfg).unwrap();
        let ctx = SecurityContext::builder().client_roles(["ci"]).build();

        assert!(rules.rules()[0].applies_to(&ctx, &ResourceScope::catalog()));
        assert!(!rules.rules()[0].applies_to(
            &ctx,
            &ResourceScope::repository("catalog", [Action::Pull])
        ));
    }

    #[test]
    fn group_name_is_last_segment() {
        assert_eq!(group_name("/org/registry-team"), "registry-team");
        assert_eq!(group_name("registry-team"), "registry-team");
    }
}
