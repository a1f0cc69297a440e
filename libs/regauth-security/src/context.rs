use std::collections::BTreeSet;

use uuid::Uuid;

/// `SecurityContext` describes the authenticated subject of a single token request.
///
/// Built by the identity plugin after the credentials were verified and handed to
/// the access mapper. It is read-only for the rest of the request.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SecurityContext {
    /// Subject ID of the authenticated user.
    subject_id: Uuid,
    /// Login name as presented in the credentials.
    username: String,
    /// Primary e-mail address, if the directory knows one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    /// Realm the subject authenticated against.
    realm: String,
    /// Client (registry service) the token is issued for.
    client_id: String,
    /// Roles assigned to the subject on `client_id` only.
    #[serde(default)]
    client_roles: BTreeSet<String>,
    /// Realm group paths the subject is a member of (e.g. `/registry-team`).
    #[serde(default)]
    groups: BTreeSet<String>,
}

impl SecurityContext {
    /// Create a new `SecurityContext` builder
    #[must_use]
    pub fn builder() -> SecurityContextBuilder {
        SecurityContextBuilder::default()
    }

    /// Create an anonymous `SecurityContext` with no subject, roles or groups
    #[must_use]
    pub fn anonymous() -> Self {
        SecurityContextBuilder::default().build()
    }

    #[must_use]
    pub fn subject_id(&self) -> Uuid {
        self.subject_id
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    #[must_use]
    pub fn realm(&self) -> &str {
        &self.realm
    }

    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Client roles of the subject, ordered.
    #[must_use]
    pub fn client_roles(&self) -> &BTreeSet<String> {
        &self.client_roles
    }

    /// Realm group paths of the subject, ordered.
    #[must_use]
    pub fn groups(&self) -> &BTreeSet<String> {
        &self.groups
    }

    #[must_use]
    pub fn has_client_role(&self, role: &str) -> bool {
        self.client_roles.contains(role)
    }

    #[must_use]
    pub fn in_group(&self, path: &str) -> bool {
        self.groups.contains(path)
    }

    /// Returns `true` when no subject has been authenticated.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.subject_id.is_nil() && self.username.is_empty()
    }
}

#[derive(Default)]
pub struct SecurityContextBuilder {
    subject_id: Option<Uuid>,
    username: Option<String>,
    email: Option<String>,
    realm: Option<String>,
    client_id: Option<String>,
    client_roles: BTreeSet<String>,
    groups: BTreeSet<String>,
}

impl SecurityContextBuilder {
    #[must_use]
    pub fn subject_id(mut self, subject_id: Uuid) -> Self {
        self.subject_id = Some(subject_id);
        self
    }

    #[must_use]
    pub fn username(mut self, username: &str) -> Self {
        self.username = Some(username.to_owned());
        self
    }

    #[must_use]
    pub fn email(mut self, email: Option<&str>) -> Self {
        self.email = email.map(ToOwned::to_owned);
        self
    }

    #[must_use]
    pub fn realm(mut self, realm: &str) -> Self {
        self.realm = Some(realm.to_owned());
        self
    }

    #[must_use]
    pub fn client_id(mut self, client_id: &str) -> Self {
        self.client_id = Some(client_id.to_owned());
        self
    }

    #[must_use]
    pub fn client_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.client_roles = roles.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups = groups.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn build(self) -> SecurityContext {
        SecurityContext {
            subject_id: self.subject_id.unwrap_or_default(),
            username: self.username.unwrap_or_default(),
            email: self.email,
            realm: self.realm.unwrap_or_default(),
            client_id: self.client_id.unwrap_or_default(),
            client_roles: self.client_roles,
            groups: self.groups,
        }
    }
}
