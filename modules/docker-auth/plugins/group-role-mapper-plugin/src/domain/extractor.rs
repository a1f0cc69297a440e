//! Role/group extraction from a security context.

use std::collections::BTreeSet;

use regauth_security::SecurityContext;

use crate::config::{NamespaceScope, RoleLevel};
use crate::domain::rules::{RuleSet, group_name};

/// What the mapper knows about a subject: its role level and its namespaces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Subject {
    level: Option<RoleLevel>,
    namespaces: BTreeSet<String>,
}

impl Subject {
    /// Extract the subject of `ctx` under the given rule set.
    #[must_use]
    pub fn extract(ctx: &SecurityContext, rules: &RuleSet) -> Self {
        Self {
            level: role_level(ctx, rules),
            namespaces: namespaces(ctx, rules),
        }
    }

    /// Highest built-in level among the held client roles.
    #[must_use]
    pub fn level(&self) -> Option<RoleLevel> {
        self.level
    }

    #[must_use]
    pub fn namespaces(&self) -> &BTreeSet<String> {
        &self.namespaces
    }

    #[must_use]
    pub fn at_least(&self, level: RoleLevel) -> bool {
        self.level.is_some_and(|held| held >= level)
    }

    #[must_use]
    pub fn owns(&self, namespace: &str) -> bool {
        self.namespaces.contains(namespace)
    }
}

fn role_level(ctx: &SecurityContext, rules: &RuleSet) -> Option<RoleLevel> {
    let names = rules.roles();
    [
        (RoleLevel::Admin, &names.admin),
        (RoleLevel::Editor, &names.editor),
        (RoleLevel::User, &names.user),
    ]
    .into_iter()
    .find(|(_, name)| ctx.has_client_role(name))
    .map(|(level, _)| level)
}

fn namespaces(ctx: &SecurityContext, rules: &RuleSet) -> BTreeSet<String> {
    let mut out = BTreeSet::new();

    if rules.uses(NamespaceScope::Group) {
        out.extend(
            ctx.groups()
                .iter()
                .filter_map(|path| group_name(path).strip_prefix(rules.group_prefix()))
                .filter(|ns| !ns.is_empty())
                .map(str::to_lowercase),
        );
    }

    let domain = ctx.email().and_then(email_domain);
    if rules.uses(NamespaceScope::Domain)
        && let Some(domain) = domain
    {
        out.insert(domain.to_lowercase());
    }
    if rules.uses(NamespaceScope::Sld)
        && let Some(sld) = domain.and_then(second_level_label)
    {
        out.insert(sld.to_lowercase());
    }

    if rules.uses(NamespaceScope::Username) && !ctx.username().is_empty() {
        out.insert(ctx.username().to_lowercase());
    }

    out
}

fn email_domain(email: &str) -> Option<&str> {
    email
        .rsplit_once('@')
        .map(|(_, domain)| domain.trim_end_matches('.'))
        .filter(|domain| !domain.is_empty())
}

/// `mail.example.com` → `example`; single-label domains have none.
fn second_level_label(domain: &str) -> Option<&str> {
    let mut labels = domain.rsplit('.');
    labels.next();
    labels.next().filter(|label| !label.is_empty())
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::config::GroupRoleMapperConfig;

    fn rules(scopes: Vec<NamespaceScope>) -> RuleSet {
        RuleSet::compile(&GroupRoleMapperConfig {
            namespace_scopes: scopes,
            ..GroupRoleMapperConfig::default()
        })
        .unwrap()
    }

    fn ns(subject: &Subject) -> Vec<&str> {
        subject.namespaces().iter().map(String::as_str).collect()
    }

    #[test]
    fn highest_role_wins() {
        let ctx = SecurityContext::builder()
            .client_roles(["user", "editor"])
            .build();
        let subject = Subject::extract(&ctx, &rules(vec![]));

        assert_eq!(subject.level(), Some(RoleLevel::Editor));
        assert!(subject.at_least(RoleLevel::User));
        assert!(!subject.at_least(RoleLevel::Admin));
    }

    #[test]
    fn unrelated_roles_give_no_level() {
        let ctx = SecurityContext::builder().client_roles(["viewer"]).build();
        let subject = Subject::extract(&ctx, &rules(vec![]));

        assert_eq!(subject.level(), None);
        assert!(!subject.at_least(RoleLevel::User));
    }

    #[test]
    fn prefixed_groups_become_namespaces() {
        let ctx = SecurityContext::builder()
            .groups(["/registry-Team", "/org/registry-ops", "/staff", "/registry-"])
            .build();
        let subject = Subject::extract(&ctx, &rules(vec![NamespaceScope::Group]));

        assert_eq!(ns(&subject), ["ops", "team"]);
    }

    #[test]
    fn email_sources() {
        let ctx = SecurityContext::builder()
            .username("Alice")
            .email(Some("alice@Mail.Example.com"))
            .build();

        let domain = Subject::extract(&ctx, &rules(vec![NamespaceScope::Domain]));
        assert_eq!(ns(&domain), ["mail.example.com"]);

        let sld = Subject::extract(&ctx, &rules(vec![NamespaceScope::Sld]));
        assert_eq!(ns(&sld), ["example"]);

        let user = Subject::extract(&ctx, &rules(vec![NamespaceScope::Username]));
        assert_eq!(ns(&user), ["alice"]);
    }

    #[test]
    fn missing_or_single_label_email_contributes_nothing() {
        let no_email = SecurityContext::builder().username("bob").build();
        let local = SecurityContext::builder()
            .username("bob")
            .email(Some("bob@localhost"))
            .build();
        let scopes = rules(vec![NamespaceScope::Domain, NamespaceScope::Sld]);

        assert!(Subject::extract(&no_email, &scopes).namespaces().is_empty());
        assert_eq!(ns(&Subject::extract(&local, &scopes)), ["localhost"]);
    }

    #[test]
    fn groups_ignored_when_source_disabled() {
        let ctx = SecurityContext::builder()
            .username("carol")
            .groups(["/registry-team"])
            .build();
        let subject = Subject::extract(&ctx, &rules(vec![NamespaceScope::Username]));

        assert_eq!(ns(&subject), ["carol"]);
    }
}
