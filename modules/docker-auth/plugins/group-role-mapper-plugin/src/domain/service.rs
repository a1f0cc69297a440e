//! Scope mapping service.

use std::sync::Arc;

use arc_swap::ArcSwap;
use docker_auth_sdk::{AccessGrant, Action, ActionSet, MappingResponse, ResourceScope};
use regauth_security::SecurityContext;

use crate::config::{GroupRoleMapperConfig, RoleLevel};
use crate::domain::error::ConfigError;
use crate::domain::extractor::Subject;
use crate::domain::rules::RuleSet;

/// Group/role mapper service.
///
/// Holds the current [`RuleSet`]; each call to [`Service::map`] evaluates
/// against one snapshot, so a concurrent reload never mixes two rule sets
/// within a request.
pub struct Service {
    rules: ArcSwap<RuleSet>,
}

impl Service {
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the configuration does not compile.
    pub fn new(cfg: &GroupRoleMapperConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            rules: ArcSwap::from_pointee(RuleSet::compile(cfg)?),
        })
    }

    /// Replace the rule set. On error the current rule set stays active.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the configuration does not compile.
    pub fn reload(&self, cfg: &GroupRoleMapperConfig) -> Result<(), ConfigError> {
        let compiled = RuleSet::compile(cfg)?;
        self.rules.store(Arc::new(compiled));
        tracing::info!(rules = cfg.rules.len(), "Mapping rules reloaded");
        Ok(())
    }

    /// Current rule set snapshot.
    #[must_use]
    pub fn rule_set(&self) -> Arc<RuleSet> {
        self.rules.load_full()
    }

    /// Map the requested scopes of `ctx` to grants.
    #[must_use]
    #[tracing::instrument(skip_all, fields(username = ctx.username(), requested = requested.len()))]
    pub fn map(&self, ctx: &SecurityContext, requested: &[ResourceScope]) -> MappingResponse {
        let rules = self.rules.load();
        let response = map_scopes(&rules, ctx, requested);
        tracing::debug!(granted = response.grants.len(), "Scopes mapped");
        response
    }
}

/// Pure mapping of requested scopes under `rules`.
///
/// Requests for the same resource are merged first. Each resource is granted
/// the requested actions that at least one source allows; resources left
/// without any action are dropped.
#[must_use]
pub fn map_scopes(
    rules: &RuleSet,
    ctx: &SecurityContext,
    requested: &[ResourceScope],
) -> MappingResponse {
    let subject = Subject::extract(ctx, rules);

    let mut merged: Vec<ResourceScope> = Vec::with_capacity(requested.len());
    for scope in requested {
        match merged.iter_mut().find(|m| m.same_resource(scope)) {
            Some(existing) => existing.merge_actions(scope),
            None => merged.push(scope.clone()),
        }
    }

    let grants = merged
        .iter()
        .filter_map(|scope| {
            let allowed = allowed_actions(rules, &subject, ctx, scope);
            let granted: ActionSet = scope.actions().intersection(&allowed).copied().collect();
            (!granted.is_empty()).then(|| AccessGrant::for_scope(scope, granted))
        })
        .collect();

    MappingResponse { grants }
}

fn allowed_actions(
    rules: &RuleSet,
    subject: &Subject,
    ctx: &SecurityContext,
    scope: &ResourceScope,
) -> ActionSet {
    let mut allowed = ActionSet::new();

    if scope.is_repository() {
        allowed.extend(role_policy(subject, scope.namespace()));
    } else if scope.is_catalog() && subject.at_least(rules.catalog_audience()) {
        allowed.insert(Action::All);
    }

    for rule in rules.rules().iter().filter(|r| r.applies_to(ctx, scope)) {
        allowed.extend(rule.actions().iter().copied());
    }

    allowed
}

fn role_policy(subject: &Subject, namespace: Option<&str>) -> &'static [Action] {
    let owned = namespace.is_some_and(|ns| subject.owns(ns));
    match subject.level() {
        Some(RoleLevel::Admin) => &[Action::Pull, Action::Push, Action::Delete, Action::All],
        Some(RoleLevel::Editor) if owned => &[Action::Pull, Action::Push],
        Some(RoleLevel::User) if owned => &[Action::Pull],
        _ => &[],
    }
}
