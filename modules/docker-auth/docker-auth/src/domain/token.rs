//! Registry token claims and signing.

use std::fs;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use data_encoding::BASE32_NOPAD;
use docker_auth_sdk::AccessGrant;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::config::{SigningAlgorithm, SigningConfig};
use crate::domain::error::DomainError;

/// Claims of a Docker registry bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub sub: String,
    pub aud: String,
    pub exp: i64,
    pub nbf: i64,
    pub iat: i64,
    pub jti: String,
    pub access: Vec<AccessGrant>,
}

impl Claims {
    #[must_use]
    pub fn new(
        issuer: &str,
        subject: &str,
        audience: &str,
        issued_at: DateTime<Utc>,
        ttl_secs: u64,
        access: Vec<AccessGrant>,
    ) -> Self {
        let iat = issued_at.timestamp();
        Self {
            iss: issuer.to_owned(),
            sub: subject.to_owned(),
            aud: audience.to_owned(),
            exp: iat.saturating_add(i64::try_from(ttl_secs).unwrap_or(i64::MAX)),
            nbf: iat,
            iat,
            jti: Uuid::new_v4().to_string(),
            access,
        }
    }
}

/// Signs claims with the configured key.
pub struct TokenSigner {
    algorithm: Algorithm,
    key: EncodingKey,
    kid: Option<String>,
}

impl TokenSigner {
    /// Load the signing key described by `cfg`.
    ///
    /// # Errors
    ///
    /// Returns `SigningKey` when a required key or secret is missing or cannot
    /// be read or parsed.
    pub fn from_config(cfg: &SigningConfig) -> Result<Self, DomainError> {
        let (algorithm, key) = match cfg.algorithm {
            SigningAlgorithm::Hs256 => {
                let secret = cfg
                    .secret
                    .as_ref()
                    .map(ExposeSecret::expose_secret)
                    .filter(|s| !s.is_empty())
                    .ok_or_else(|| {
                        DomainError::SigningKey("HS256 requires 'signing.secret'".to_owned())
                    })?;
                (Algorithm::HS256, EncodingKey::from_secret(secret.as_bytes()))
            }
            SigningAlgorithm::Rs256 => {
                let pem = read_private_key(cfg)?;
                let key = EncodingKey::from_rsa_pem(&pem)
                    .map_err(|e| DomainError::SigningKey(format!("invalid RSA private key: {e}")))?;
                (Algorithm::RS256, key)
            }
            SigningAlgorithm::Es256 => {
                let pem = read_private_key(cfg)?;
                let key = EncodingKey::from_ec_pem(&pem)
                    .map_err(|e| DomainError::SigningKey(format!("invalid EC private key: {e}")))?;
                (Algorithm::ES256, key)
            }
        };

        let kid = match (&cfg.kid, &cfg.public_key_path) {
            (Some(kid), _) => Some(kid.clone()),
            (None, Some(path)) => Some(key_id_from_pem(&read_to_string(path)?)?),
            (None, None) => None,
        };

        Ok(Self { algorithm, key, kid })
    }

    /// Create a signer from an HS256 secret.
    #[must_use]
    pub fn hs256(secret: &[u8], kid: Option<String>) -> Self {
        Self {
            algorithm: Algorithm::HS256,
            key: EncodingKey::from_secret(secret),
            kid,
        }
    }

    #[must_use]
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    #[must_use]
    pub fn kid(&self) -> Option<&str> {
        self.kid.as_deref()
    }

    /// Encode and sign `claims` as a compact JWS.
    ///
    /// # Errors
    ///
    /// Returns `Signing` when the key cannot sign the token.
    pub fn sign(&self, claims: &Claims) -> Result<String, DomainError> {
        let mut header = Header::new(self.algorithm);
        header.kid.clone_from(&self.kid);
        Ok(jsonwebtoken::encode(&header, claims, &self.key)?)
    }
}

fn read_private_key(cfg: &SigningConfig) -> Result<Vec<u8>, DomainError> {
    let path = cfg.private_key_path.as_deref().ok_or_else(|| {
        DomainError::SigningKey(format!(
            "{} requires 'signing.private_key_path'",
            cfg.algorithm.as_str()
        ))
    })?;
    fs::read(path).map_err(|e| DomainError::SigningKey(format!("{}: {e}", path.display())))
}

fn read_to_string(path: &Path) -> Result<String, DomainError> {
    fs::read_to_string(path).map_err(|e| DomainError::SigningKey(format!("{}: {e}", path.display())))
}

/// libtrust key ID of a PEM encoded public key (`BEGIN PUBLIC KEY`).
///
/// # Errors
///
/// Returns `SigningKey` when the input is not a PEM public key.
pub fn key_id_from_pem(pem: &str) -> Result<String, DomainError> {
    let mut lines = pem.lines().map(str::trim).skip_while(|l| l.is_empty());
    if lines.next() != Some("-----BEGIN PUBLIC KEY-----") {
        return Err(DomainError::SigningKey(
            "public key must be a PEM 'PUBLIC KEY' block".to_owned(),
        ));
    }
    let body: String = lines
        .take_while(|l| !l.starts_with("-----END"))
        .collect();
    let der = STANDARD
        .decode(body)
        .map_err(|e| DomainError::SigningKey(format!("invalid public key PEM: {e}")))?;
    Ok(libtrust_key_id(&der))
}

/// libtrust key ID: SHA-256 of the DER `SubjectPublicKeyInfo`, truncated to
/// 240 bits, base32 encoded and grouped by four characters.
#[must_use]
pub fn libtrust_key_id(spki_der: &[u8]) -> String {
    let digest = Sha256::digest(spki_der);
    let encoded = BASE32_NOPAD.encode(&digest[..30]);
    let mut out = String::with_capacity(encoded.len() + encoded.len() / 4);
    for (i, c) in encoded.chars().enumerate() {
        if i > 0 && i % 4 == 0 {
            out.push(':');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use docker_auth_sdk::{Action, ResourceScope};
    use jsonwebtoken::{DecodingKey, Validation};

    #[test]
    fn key_id_is_grouped_base32_of_truncated_digest() {
        assert_eq!(libtrust_key_id(b"any key material"), "QTEL:AOSZ:MDTS:6UOW:2IH4:QUMC:RSEZ:DTFP:BG4L:GXCK:USMS:KCNG");
    }

    #[test]
    fn key_id_has_twelve_groups() {
        let kid = libtrust_key_id(b"any key material");
        let groups: Vec<&str> = kid.split(':').collect();
        assert_eq!(groups.len(), 12);
        assert!(groups.iter().all(|g| g.len() == 4));
    }

    #[test]
    fn non_public_key_pem_is_rejected() {
        let err = key_id_from_pem("-----BEGIN CERTIFICATE-----\nAAAA\n-----END CERTIFICATE-----\n");
        assert!(matches!(err, Err(DomainError::SigningKey(_))));
    }

    #[test]
    fn claims_timing() {
        let at = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let claims = Claims::new("regauth", "alice", "registry.local", at, 300, vec![]);

        assert_eq!(claims.iat, at.timestamp());
        assert_eq!(claims.nbf, claims.iat);
        assert_eq!(claims.exp - claims.iat, 300);
        assert!(Uuid::parse_str(&claims.jti).is_ok());
    }

    #[test]
    fn hs256_round_trip_keeps_access_and_kid() {
        let signer = TokenSigner::hs256(b"secret", Some("test-kid".to_owned()));
        let grant = docker_auth_sdk::AccessGrant::for_scope(
            &ResourceScope::repository("team/app", [Action::Pull]),
            [Action::Pull].into(),
        );
        let claims = Claims::new("regauth", "alice", "registry.local", Utc::now(), 60, vec![grant]);

        let token = signer.sign(&claims).unwrap();

        let header = jsonwebtoken::decode_header(&token).unwrap();
        assert_eq!(header.kid.as_deref(), Some("test-kid"));

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&["registry.local"]);
        validation.set_issuer(&["regauth"]);
        let decoded =
            jsonwebtoken::decode::<Claims>(&token, &DecodingKey::from_secret(b"secret"), &validation)
                .unwrap();
        assert_eq!(decoded.claims, claims);
    }

    #[test]
    fn hs256_without_secret_is_rejected() {
        let cfg = SigningConfig {
            algorithm: SigningAlgorithm::Hs256,
            ..SigningConfig::default()
        };
        assert!(matches!(
            TokenSigner::from_config(&cfg),
            Err(DomainError::SigningKey(_))
        ));
    }

    #[test]
    fn rs256_without_key_path_is_rejected() {
        assert!(matches!(
            TokenSigner::from_config(&SigningConfig::default()),
            Err(DomainError::SigningKey(_))
        ));
    }
}
