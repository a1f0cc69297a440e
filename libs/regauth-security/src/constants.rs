//! Well-known names used across the token service.

/// Realm served when the configuration does not name one.
pub const DEFAULT_REALM: &str = "docker";

/// Default client role names recognised by the group/role mapper.
///
/// The mapper configuration may rename them; these are only the defaults.
pub mod roles {
    /// Full access to every repository and the catalog.
    pub const ADMIN: &str = "admin";

    /// Pull and push inside the subject's namespaces.
    pub const EDITOR: &str = "editor";

    /// Pull inside the subject's namespaces.
    pub const USER: &str = "user";
}
