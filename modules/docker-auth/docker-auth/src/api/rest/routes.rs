use std::sync::Arc;

use axum::routing::get;
use axum::{Extension, Router};

use crate::api::rest::handlers;
use crate::domain::service::Service;

/// Token endpoint path, Keycloak compatible.
pub const TOKEN_PATH: &str = "/realms/{realm}/protocol/docker-v2/auth";

pub const HEALTH_PATH: &str = "/health";

pub fn register_routes(router: Router, service: Arc<Service>) -> Router {
    router
        .route(TOKEN_PATH, get(handlers::get_token))
        .route(HEALTH_PATH, get(handlers::health))
        .layer(Extension(service))
}
