//! Domain models for the `docker_auth` module.

use regauth_security::SecurityContext;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::scope::{ActionSet, ResourceScope};

/// One entry of the `access` claim of a Docker registry token.
///
/// Serialized in the Docker distribution `access` claim format:
/// `{"type": "repository", "name": "team/app", "actions": ["pull", "push"]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessGrant {
    /// Resource type (`repository`, `registry`, ...).
    #[serde(rename = "type")]
    pub resource_type: String,
    /// Resource class (`plugin` for `repository(plugin)`), omitted when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    /// Resource name (`team/app`, `catalog`, ...).
    pub name: String,
    /// Granted actions, ordered.
    pub actions: ActionSet,
}

impl AccessGrant {
    /// Build a grant for the resource addressed by `scope` with the given actions.
    #[must_use]
    pub fn for_scope(scope: &ResourceScope, actions: ActionSet) -> Self {
        Self {
            resource_type: scope.resource_type().to_owned(),
            class: scope.resource_class().map(ToOwned::to_owned),
            name: scope.name().to_owned(),
            actions,
        }
    }
}

/// Input of an access mapper plugin.
#[derive(Debug, Clone)]
pub struct MappingRequest {
    /// The authenticated subject.
    pub security_context: SecurityContext,
    /// Scopes requested by the registry client, in request order.
    pub requested: Vec<ResourceScope>,
}

/// Output of an access mapper plugin.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingResponse {
    /// Grants in the order their resources were first requested.
    /// Resources without any granted action are absent.
    pub grants: Vec<AccessGrant>,
}

/// Username and password presented via HTTP Basic authentication.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    /// Wrapped in `SecretString` so `Debug` output never shows it.
    pub password: SecretString,
}

impl Credentials {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }
}

/// A Docker registry token request.
#[derive(Debug, Clone)]
pub struct TokenRequest {
    /// Realm from the request path.
    pub realm: String,
    /// The `service` parameter; identifies the registry client.
    pub service: String,
    /// Parsed `scope` parameters.
    pub scopes: Vec<ResourceScope>,
    /// The optional `account` parameter; must match the authenticated user.
    pub account: Option<String>,
    /// Basic credentials, if the client sent any.
    pub credentials: Option<Credentials>,
}

/// Token response body of the Docker token authentication protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
    /// Same value as `token`, for OAuth 2.0 compatible clients.
    pub access_token: String,
    /// Lifetime in seconds.
    pub expires_in: u64,
    /// RFC 3339 issue time.
    pub issued_at: String,
}
