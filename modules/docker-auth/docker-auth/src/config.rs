//! Configuration for the `docker_auth` module.

use std::path::PathBuf;

use regauth_security::constants::DEFAULT_REALM;
use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Module configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DockerAuthConfig {
    /// Realm served by this instance (`/realms/{realm}/...`).
    pub realm: String,

    /// `iss` claim of issued tokens. Must match the registry's `auth.token.issuer`.
    pub issuer: String,

    /// Accepted `service` values (registry client IDs).
    pub clients: Vec<String>,

    /// Token lifetime in seconds.
    pub token_ttl_secs: u64,

    /// Vendor selector for the access mapper plugin.
    pub mapper_vendor: String,

    /// Vendor selector for the identity plugin.
    pub identity_vendor: String,

    pub signing: SigningConfig,
}

impl Default for DockerAuthConfig {
    fn default() -> Self {
        Self {
            realm: DEFAULT_REALM.to_owned(),
            issuer: "regauth".to_owned(),
            clients: Vec::new(),
            token_ttl_secs: 300,
            mapper_vendor: "hyperspot".to_owned(),
            identity_vendor: "hyperspot".to_owned(),
            signing: SigningConfig::default(),
        }
    }
}

/// Token signing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SigningConfig {
    pub algorithm: SigningAlgorithm,

    /// PEM private key (RS256: PKCS#1 or PKCS#8, ES256: PKCS#8).
    pub private_key_path: Option<PathBuf>,

    /// Shared secret for HS256.
    #[serde(
        serialize_with = "serialize_redacted",
        deserialize_with = "deserialize_secret"
    )]
    pub secret: Option<SecretString>,

    /// PEM public key (`BEGIN PUBLIC KEY`) used to derive the libtrust key ID.
    pub public_key_path: Option<PathBuf>,

    /// Explicit `kid` header; takes precedence over `public_key_path`.
    pub kid: Option<String>,
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            algorithm: SigningAlgorithm::Rs256,
            private_key_path: None,
            secret: None,
            public_key_path: None,
            kid: None,
        }
    }
}

/// Supported JWS algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SigningAlgorithm {
    #[serde(rename = "RS256")]
    Rs256,
    #[serde(rename = "ES256")]
    Es256,
    #[serde(rename = "HS256")]
    Hs256,
}

impl SigningAlgorithm {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rs256 => "RS256",
            Self::Es256 => "ES256",
            Self::Hs256 => "HS256",
        }
    }
}

#[allow(clippy::ref_option)] // signature required by `serialize_with`
fn serialize_redacted<S: Serializer>(
    secret: &Option<SecretString>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match secret {
        Some(_) => serializer.serialize_some("[REDACTED]"),
        None => serializer.serialize_none(),
    }
}

fn deserialize_secret<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<SecretString>, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.map(SecretString::from))
}
