use std::sync::Arc;

use axum::Json;
use axum::extract::{Extension, Path, RawQuery};
use axum::http::{HeaderMap, header};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use docker_auth_sdk::{Credentials, TokenRequest, TokenResponse, parse_scopes};

use crate::api::rest::dto::{HealthDto, TokenQuery};
use crate::api::rest::error::domain_error_to_problem;
use crate::api::rest::problem::Problem;
use crate::domain::error::DomainError;
use crate::domain::service::Service;

/// Docker token endpoint.
#[tracing::instrument(skip_all, fields(realm = %realm))]
pub async fn get_token(
    Extension(svc): Extension<Arc<Service>>,
    Path(realm): Path<String>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Result<Json<TokenResponse>, Problem> {
    let instance = format!("/realms/{realm}/protocol/docker-v2/auth");
    issue(&svc, realm, query.as_deref(), &headers)
        .await
        .map(Json)
        .map_err(|e| domain_error_to_problem(&e, svc.realm()).with_instance(instance))
}

async fn issue(
    svc: &Service,
    realm: String,
    query: Option<&str>,
    headers: &HeaderMap,
) -> Result<TokenResponse, DomainError> {
    if realm != svc.realm() {
        return Err(DomainError::UnknownRealm(realm));
    }

    let query = TokenQuery::parse(query);
    let service = query
        .service
        .filter(|s| !s.is_empty())
        .ok_or_else(|| DomainError::InvalidRequest("missing 'service' parameter".to_owned()))?;
    let scopes = parse_scopes(&query.scopes)?;

    svc.issue_token(TokenRequest {
        realm,
        service,
        scopes,
        account: query.account,
        credentials: basic_credentials(headers),
    })
    .await
}

/// Health check.
#[allow(clippy::unused_async)] // axum handler
pub async fn health() -> Json<HealthDto> {
    Json(HealthDto { status: "ok" })
}

/// Extract HTTP Basic credentials. Malformed headers count as absent.
fn basic_credentials(headers: &HeaderMap) -> Option<Credentials> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    if username.is_empty() {
        return None;
    }
    Some(Credentials::new(username, password))
}
