use axum::http::StatusCode;

use crate::api::rest::problem::Problem;
use crate::domain::error::DomainError;

/// `WWW-Authenticate` challenge for `realm`.
#[must_use]
pub fn basic_challenge(realm: &str) -> String {
    format!("Basic realm=\"{realm}\"")
}

/// Convert domain errors to HTTP Problem responses
#[must_use]
pub fn domain_error_to_problem(err: &DomainError, realm: &str) -> Problem {
    match err {
        DomainError::UnknownRealm(_) => {
            Problem::new(StatusCode::NOT_FOUND, "Realm Not Found", err.to_string())
        }

        DomainError::MissingCredentials | DomainError::Unauthorized(_) => {
            tracing::debug!(error = %err, "Token request rejected");
            Problem::new(StatusCode::UNAUTHORIZED, "Unauthorized", err.to_string())
                .with_challenge(basic_challenge(realm))
        }

        DomainError::UnknownService(_)
        | DomainError::AccountMismatch { .. }
        | DomainError::InvalidScope(_)
        | DomainError::InvalidRequest(_) => {
            Problem::new(StatusCode::BAD_REQUEST, "Invalid Request", err.to_string())
        }

        DomainError::PluginNotFound { .. } | DomainError::PluginUnavailable(_) => {
            tracing::error!(error = %err, "Token service dependency unavailable");
            Problem::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "Service Unavailable",
                "Token service temporarily unavailable",
            )
        }

        DomainError::SigningKey(_) | DomainError::Signing(_) | DomainError::Internal(_) => {
            // Log the details, do not expose them to the client
            tracing::error!(error = ?err, "Token issuance failed");
            Problem::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error",
                "An internal error occurred",
            )
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        let cases = [
            (DomainError::UnknownRealm("x".to_owned()), StatusCode::NOT_FOUND),
            (DomainError::MissingCredentials, StatusCode::UNAUTHORIZED),
            (DomainError::UnknownService("x".to_owned()), StatusCode::BAD_REQUEST),
            (
                DomainError::PluginNotFound {
                    vendor: "x".to_owned(),
                },
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (DomainError::Internal("db password".to_owned()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            let problem = domain_error_to_problem(&err, "docker");
            assert_eq!(problem.status_code(), status, "{err}");
        }
    }

    #[test]
    fn unauthorized_carries_challenge_and_internal_hides_detail() {
        let unauthorized = domain_error_to_problem(&DomainError::MissingCredentials, "docker");
        assert_eq!(unauthorized.challenge.as_deref(), Some("Basic realm=\"docker\""));

        let internal = domain_error_to_problem(&DomainError::Internal("db password".to_owned()), "docker");
        assert!(!internal.detail.contains("db password"));
        assert!(internal.challenge.is_none());
    }
}
