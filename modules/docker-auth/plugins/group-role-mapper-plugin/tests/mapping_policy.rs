#![allow(clippy::unwrap_used, clippy::expect_used)]

use docker_auth_sdk::{
    AccessMapperPluginClient, Action, MappingRequest, PluginRegistry, ResourceScope,
    parse_scopes,
};
use group_role_mapper_plugin::config::{MappingRuleConfig, NamespaceScope, RoleLevel};
use group_role_mapper_plugin::domain::rules::RuleSet;
use group_role_mapper_plugin::domain::service::map_scopes;
use group_role_mapper_plugin::{GroupRoleMapperConfig, GroupRoleMapperPlugin};
use regauth_security::SecurityContext;

fn subject(roles: &[&str], groups: &[&str], email: Option<&str>) -> SecurityContext {
    SecurityContext::builder()
        .username("alice")
        .email(email)
        .realm("docker")
        .client_id("registry.example.com")
        .client_roles(roles.iter().copied())
        .groups(groups.iter().copied())
        .build()
}

fn rule(role: Option<&str>, group: Option<&str>, repository: &str, actions: &[Action]) -> MappingRuleConfig {
    MappingRuleConfig {
        role: role.map(ToOwned::to_owned),
        group: group.map(ToOwned::to_owned),
        resource_type: "repository".to_owned(),
        repository: repository.to_owned(),
        actions: actions.to_vec(),
    }
}

fn granted(rules: &RuleSet, ctx: &SecurityContext, scopes: &[&str]) -> Vec<String> {
    let requested = parse_scopes(scopes).unwrap();
    map_scopes(rules, ctx, &requested)
        .grants
        .into_iter()
        .map(|g| {
            let actions: Vec<String> = g.actions.iter().map(ToString::to_string).collect();
            format!("{}:{}:{}", g.resource_type, g.name, actions.join(","))
        })
        .collect()
}

fn full_config() -> GroupRoleMapperConfig {
    GroupRoleMapperConfig {
        namespace_scopes: vec![NamespaceScope::Group, NamespaceScope::Sld],
        catalog_audience: RoleLevel::Editor,
        rules: vec![
            rule(Some("ci-*"), None, "mirror/*", &[Action::Pull, Action::Push]),
            rule(None, Some("/auditors"), "*/*", &[Action::Pull]),
        ],
        ..GroupRoleMapperConfig::default()
    }
}

#[test]
fn same_input_same_grants() {
    let rules = RuleSet::compile(&full_config()).unwrap();
    let ctx = subject(&["editor", "ci-build"], &["/registry-team"], Some("a@corp.example.com"));
    let scopes = [
        "repository:team/app:pull,push,delete",
        "repository:mirror/alpine:push",
        "registry:catalog:*",
    ];

    let first = granted(&rules, &ctx, &scopes);
    for _ in 0..10 {
        assert_eq!(granted(&rules, &ctx, &scopes), first);
    }
}

#[test]
fn grants_never_exceed_request() {
    let rules = RuleSet::compile(&full_config()).unwrap();
    let subjects = [
        subject(&["admin"], &[], None),
        subject(&["editor"], &["/registry-team"], None),
        subject(&["user", "ci-x"], &["/auditors"], Some("a@corp.example.com")),
        subject(&[], &[], None),
    ];
    let requests = [
        "repository:team/app:pull",
        "repository:team/app:push,delete",
        "repository:mirror/alpine:*",
        "repository:example/tool:pull,push",
        "registry:catalog:*",
    ];

    for ctx in &subjects {
        for raw in requests {
            let requested = ResourceScope::parse(raw).unwrap();
            let response = map_scopes(&rules, ctx, std::slice::from_ref(&requested));
            for grant in &response.grants {
                assert_eq!(grant.name, requested.name());
                assert!(
                    grant.actions.is_subset(requested.actions()),
                    "{raw} granted {:?}",
                    grant.actions
                );
                assert!(!grant.actions.is_empty());
            }
        }
    }
}

#[test]
fn custom_rules_union_with_role_policy() {
    let rules = RuleSet::compile(&full_config()).unwrap();
    let ctx = subject(&["user", "ci-build"], &["/registry-team"], None);

    assert_eq!(
        granted(
            &rules,
            &ctx,
            &["repository:team/app:pull,push", "repository:mirror/alpine:pull,push,delete"]
        ),
        ["repository:team/app:pull", "repository:mirror/alpine:pull,push"]
    );
}

#[test]
fn group_rule_grants_without_client_role() {
    let rules = RuleSet::compile(&full_config()).unwrap();
    let ctx = subject(&[], &["/auditors"], None);

    assert_eq!(
        granted(&rules, &ctx, &["repository:any/repo:pull,push", "repository:single:pull"]),
        ["repository:any/repo:pull"]
    );
}

#[test]
fn sld_namespace_from_email() {
    let rules = RuleSet::compile(&full_config()).unwrap();
    let ctx = subject(&["editor"], &[], Some("alice@mail.example.com"));

    assert_eq!(
        granted(&rules, &ctx, &["repository:example/tool:pull,push", "repository:mail/tool:pull"]),
        ["repository:example/tool:pull,push"]
    );
}

#[test]
fn catalog_follows_audience() {
    let rules = RuleSet::compile(&full_config()).unwrap();

    assert_eq!(
        granted(&rules, &subject(&["editor"], &[], None), &["registry:catalog:*"]),
        ["registry:catalog:*"]
    );
    assert!(granted(&rules, &subject(&["user"], &[], None), &["registry:catalog:*"]).is_empty());
}

#[test]
fn email_domain_namespace_grants_editor_access() {
    let rules = RuleSet::compile(&GroupRoleMapperConfig {
        namespace_scopes: vec![NamespaceScope::Domain],
        ..GroupRoleMapperConfig::default()
    })
    .unwrap();
    let ctx = subject(&["editor"], &[], Some("alice@example.com"));

    assert_eq!(
        granted(
            &rules,
            &ctx,
            &["repository:example.com/app:pull,push,delete", "repository:other.org/app:pull"]
        ),
        ["repository:example.com/app:pull,push"]
    );
}

#[test]
fn first_path_component_is_the_namespace() {
    let rules = RuleSet::compile(&GroupRoleMapperConfig::default()).unwrap();
    let ctx = subject(&["user"], &["/registry-team"], None);

    assert_eq!(
        granted(
            &rules,
            &ctx,
            &["repository:team/app:pull", "repository:localhost:5000/team/app:pull"]
        ),
        ["repository:team/app:pull"]
    );
}

#[tokio::test]
async fn plugin_registers_and_is_selectable() {
    let plugin = GroupRoleMapperPlugin::init(&GroupRoleMapperConfig::default()).unwrap();
    let mut registry: PluginRegistry<dyn AccessMapperPluginClient> = PluginRegistry::new();
    plugin.register(&mut registry).unwrap();

    let (instance, client) = registry.select("hyperspot").unwrap();
    assert_eq!(instance.priority, 100);

    let response = client
        .map_access(MappingRequest {
            security_context: subject(&["admin"], &[], None),
            requested: parse_scopes(["repository:alpine:delete"]).unwrap(),
        })
        .await
        .unwrap();
    assert_eq!(response.grants.len(), 1);

    assert!(plugin.register(&mut registry).is_err());
}

#[test]
fn plugin_reload_rejects_invalid_config() {
    let plugin = GroupRoleMapperPlugin::init(&GroupRoleMapperConfig::default()).unwrap();
    let invalid = GroupRoleMapperConfig {
        rules: vec![rule(None, None, "x/*", &[Action::Pull])],
        ..GroupRoleMapperConfig::default()
    };

    assert!(plugin.reload(&invalid).is_err());
    assert!(plugin.service().rule_set().rules().is_empty());

    plugin.reload(&full_config()).unwrap();
    assert_eq!(plugin.service().rule_set().rules().len(), 2);
}
