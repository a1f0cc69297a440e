//! Docker Registry v2 scope model.
//!
//! A scope string has the form `type[(class)]:name:action[,action...]`, e.g.
//! `repository:team/app:pull,push` or `registry:catalog:*`. The resource name may
//! contain a `:` itself (`repository:localhost:5000/app:pull`), so the type is
//! split at the first colon and the action list at the last one.
//!
//! Repository names follow the distribution reference grammar: an optional
//! `host[:port]/` prefix followed by lowercase path components separated by `/`.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ScopeParseError;

/// Resource type of repository scopes.
pub const REPOSITORY: &str = "repository";

/// Resource type of registry-wide scopes.
pub const REGISTRY: &str = "registry";

/// Name of the registry catalog resource.
pub const CATALOG: &str = "catalog";

const MAX_NAME_LEN: usize = 255;

static RESOURCE_TYPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-z0-9]+)(?:\(([a-z0-9]+)\))?$").unwrap_or_else(|e| unreachable!("{e}"))
});

static REPOSITORY_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?:(?:[a-zA-Z0-9]|[a-zA-Z0-9][a-zA-Z0-9-]*[a-zA-Z0-9])",
        r"(?:\.(?:[a-zA-Z0-9]|[a-zA-Z0-9][a-zA-Z0-9-]*[a-zA-Z0-9]))*(?::[0-9]+)?/)?",
        r"[a-z0-9]+(?:(?:[._]|__|-+)[a-z0-9]+)*",
        r"(?:/[a-z0-9]+(?:(?:[._]|__|-+)[a-z0-9]+)*)*$",
    ))
    .unwrap_or_else(|e| unreachable!("{e}"))
});

/// An action on a registry resource.
///
/// Ordered `pull < push < delete < *`, which is also the order actions appear
/// in issued tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Pull,
    Push,
    Delete,
    #[serde(rename = "*")]
    All,
}

/// Ordered, duplicate-free set of actions.
pub type ActionSet = BTreeSet<Action>;

impl Action {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pull => "pull",
            Self::Push => "push",
            Self::Delete => "delete",
            Self::All => "*",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = ScopeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pull" => Ok(Self::Pull),
            "push" => Ok(Self::Push),
            "delete" => Ok(Self::Delete),
            "*" => Ok(Self::All),
            other => Err(ScopeParseError::UnknownAction(other.to_owned())),
        }
    }
}

/// A single requested (or granted) resource scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceScope {
    resource_type: String,
    resource_class: Option<String>,
    name: String,
    actions: ActionSet,
}

impl ResourceScope {
    /// Create a scope without validating the name.
    #[must_use]
    pub fn new(
        resource_type: impl Into<String>,
        name: impl Into<String>,
        actions: impl IntoIterator<Item = Action>,
    ) -> Self {
        Self {
            resource_type: resource_type.into(),
            resource_class: None,
            name: name.into(),
            actions: actions.into_iter().collect(),
        }
    }

    /// `repository:<name>:<actions>`
    #[must_use]
    pub fn repository(name: impl Into<String>, actions: impl IntoIterator<Item = Action>) -> Self {
        Self::new(REPOSITORY, name, actions)
    }

    /// `registry:catalog:*`
    #[must_use]
    pub fn catalog() -> Self {
        Self::new(REGISTRY, CATALOG, [Action::All])
    }

    /// Parse a single scope string.
    ///
    /// Unknown actions are dropped, so `repository:app:pull,tag` yields a scope
    /// requesting only `pull`.
    ///
    /// # Errors
    ///
    /// - `Malformed` when the string does not have three `:`-separated parts
    /// - `InvalidResourceType` for a type outside `[a-z0-9]+` (optionally with a class)
    /// - `InvalidRepositoryName` for repository names outside the reference grammar
    pub fn parse(s: &str) -> Result<Self, ScopeParseError> {
        let malformed = || ScopeParseError::Malformed(s.to_owned());

        let (type_part, rest) = s.split_once(':').ok_or_else(malformed)?;
        let (name, actions_part) = rest.rsplit_once(':').ok_or_else(malformed)?;
        if name.is_empty() {
            return Err(malformed());
        }

        let caps = RESOURCE_TYPE_RE
            .captures(type_part)
            .ok_or_else(|| ScopeParseError::InvalidResourceType(type_part.to_owned()))?;
        let resource_type = caps[1].to_owned();
        let resource_class = caps.get(2).map(|m| m.as_str().to_owned());

        if resource_type == REPOSITORY && !is_valid_repository_name(name) {
            return Err(ScopeParseError::InvalidRepositoryName(name.to_owned()));
        }

        let mut actions = ActionSet::new();
        for raw in actions_part.split(',').map(str::trim).filter(|a| !a.is_empty()) {
            match raw.parse::<Action>() {
                Ok(action) => {
                    actions.insert(action);
                }
                Err(e) => tracing::debug!(scope = s, error = %e, "Dropping unknown action"),
            }
        }

        Ok(Self {
            resource_type,
            resource_class,
            name: name.to_owned(),
            actions,
        })
    }

    #[must_use]
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    #[must_use]
    pub fn resource_class(&self) -> Option<&str> {
        self.resource_class.as_deref()
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn actions(&self) -> &ActionSet {
        &self.actions
    }

    #[must_use]
    pub fn is_repository(&self) -> bool {
        self.resource_type == REPOSITORY
    }

    #[must_use]
    pub fn is_catalog(&self) -> bool {
        self.resource_type == REGISTRY && self.name == CATALOG
    }

    /// Returns `true` when both scopes address the same resource, regardless of actions.
    #[must_use]
    pub fn same_resource(&self, other: &Self) -> bool {
        self.resource_type == other.resource_type
            && self.resource_class == other.resource_class
            && self.name == other.name
    }

    /// Add the actions of `other` to this scope.
    pub fn merge_actions(&mut self, other: &Self) {
        self.actions.extend(other.actions.iter().copied());
    }

    /// The namespace of a repository: its first path component.
    ///
    /// Registry clients send names relative to the registry, so a leading
    /// component with dots (`example.com/app`) is a namespace like any other.
    ///
    /// `team/app` → `team`, `example.com/app` → `example.com`, `app` → `None`.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        if !self.is_repository() {
            return None;
        }
        self.name.split_once('/').map(|(ns, _)| ns)
    }
}

impl fmt::Display for ResourceScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.resource_type)?;
        if let Some(class) = &self.resource_class {
            write!(f, "({class})")?;
        }
        write!(f, ":{}:", self.name)?;
        for (i, action) in self.actions.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            f.write_str(action.as_str())?;
        }
        Ok(())
    }
}

impl FromStr for ResourceScope {
    type Err = ScopeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Parse every scope from a list of `scope` query values.
///
/// Docker clients repeat the `scope` parameter, OAuth-style clients pack several
/// scopes into one value separated by spaces; both are accepted.
///
/// # Errors
///
/// Returns the first [`ScopeParseError`] encountered.
pub fn parse_scopes<I, S>(values: I) -> Result<Vec<ResourceScope>, ScopeParseError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut scopes = Vec::new();
    for value in values {
        for raw in value.as_ref().split_whitespace() {
            scopes.push(ResourceScope::parse(raw)?);
        }
    }
    Ok(scopes)
}

fn is_valid_repository_name(name: &str) -> bool {
    name.len() <= MAX_NAME_LEN && REPOSITORY_NAME_RE.is_match(name)
}
