use serde::Serialize;

/// Parameters of a token request.
///
/// `scope` may be repeated; `client_id` and `offline_token` are accepted and ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenQuery {
    pub service: Option<String>,
    pub scopes: Vec<String>,
    pub account: Option<String>,
}

impl TokenQuery {
    /// Parse a raw, URL-encoded query string.
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        let mut query = Self::default();
        for (key, value) in url::form_urlencoded::parse(raw.unwrap_or_default().as_bytes()) {
            match key.as_ref() {
                "service" => query.service = Some(value.into_owned()),
                "scope" => query.scopes.push(value.into_owned()),
                "account" => query.account = Some(value.into_owned()),
                _ => {}
            }
        }
        query
    }
}

/// Health check response body.
#[derive(Debug, Clone, Serialize)]
pub struct HealthDto {
    pub status: &'static str,
}
