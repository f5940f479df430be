//! API key authorizer (HTTP API simple responses)

use http::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, warn};

/// Header carrying the caller's key; matched case-insensitively
pub const API_KEY_HEADER: &str = "x-api-key";

/// Errors while inspecting the request
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Request carries conflicting API key values")]
    ConflictingApiKeys,
}

/// Request authorizer event (payload format 2.0), only the parts we read
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthorizerRequest {
    pub version: Option<String>,
    pub route_arn: Option<String>,
    pub route_key: Option<String>,
    pub headers: Option<HashMap<String, String>>,
}

/// Why a request was or was not authorized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthReason {
    Authorized,
    InvalidApiKey,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    pub reason: AuthReason,
}

/// Simple authorizer response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizerResponse {
    pub is_authorized: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal_id: Option<String>,
    pub context: AuthContext,
}

impl AuthorizerResponse {
    fn new(reason: AuthReason) -> Self {
        Self {
            is_authorized: reason == AuthReason::Authorized,
            principal_id: None,
            context: AuthContext { reason },
        }
    }

    pub fn allow() -> Self {
        Self::new(AuthReason::Authorized)
    }

    pub fn deny(reason: AuthReason) -> Self {
        debug_assert!(reason != AuthReason::Authorized);
        Self::new(reason)
    }
}

/// Compares the caller's `x-api-key` header against the configured key.
///
/// With no key configured every request is denied. Keys are compared as raw
/// bytes, so any value equal to the configured key is accepted. A request
/// whose API key cannot be determined is denied with reason `error`.
#[derive(Clone)]
pub struct ApiKeyAuthorizer {
    expected_digest: Option<[u8; 32]>,
}

impl std::fmt::Debug for ApiKeyAuthorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyAuthorizer")
            .field("configured", &self.expected_digest.is_some())
            .finish()
    }
}

fn digest(key: &[u8]) -> [u8; 32] {
    Sha256::digest(key).into()
}

impl ApiKeyAuthorizer {
    /// An empty key counts as not configured
    pub fn new(expected_key: Option<&str>) -> Self {
        Self {
            expected_digest: expected_key.filter(|k| !k.is_empty()).map(|k| digest(k.as_bytes())),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.expected_digest.is_some()
    }

    pub fn authorize(&self, headers: &HeaderMap) -> AuthorizerResponse {
        self.decide(provided_key(headers).map(|key| self.matches(key)))
    }

    /// Authorize from the plain header map of a gateway event.
    ///
    /// The lowercase `x-api-key` wins over other spellings of the name.
    pub fn authorize_map(&self, headers: &HashMap<String, String>) -> AuthorizerResponse {
        let provided = headers.get(API_KEY_HEADER).or_else(|| {
            headers
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(API_KEY_HEADER))
                .map(|(_, value)| value)
        });
        self.decide(Ok(self.matches(provided.map(String::as_bytes))))
    }

    /// Authorize a request authorizer event
    pub fn authorize_event(&self, event: &AuthorizerRequest) -> AuthorizerResponse {
        match &event.headers {
            Some(headers) => self.authorize_map(headers),
            None => AuthorizerResponse::deny(AuthReason::InvalidApiKey),
        }
    }

    fn decide(&self, outcome: Result<bool, AuthError>) -> AuthorizerResponse {
        match outcome {
            Ok(true) => AuthorizerResponse::allow(),
            Ok(false) => {
                debug!("Rejected request with missing or invalid API key");
                AuthorizerResponse::deny(AuthReason::InvalidApiKey)
            }
            Err(e) => {
                warn!(error = %e, "Authorizer failed, denying request");
                AuthorizerResponse::deny(AuthReason::Error)
            }
        }
    }

    fn matches(&self, provided: Option<&[u8]>) -> bool {
        match (&self.expected_digest, provided) {
            // Fixed-length digests keep the comparison independent of key length
            (Some(expected), Some(key)) if !key.is_empty() => digest(key) == *expected,
            _ => false,
        }
    }
}

/// The single API key value of an HTTP request, if any
fn provided_key(headers: &HeaderMap) -> Result<Option<&[u8]>, AuthError> {
    let mut values = headers.get_all(API_KEY_HEADER).iter().map(HeaderValue::as_bytes);
    let Some(first) = values.next() else {
        return Ok(None);
    };

    if values.any(|v| v != first) {
        return Err(AuthError::ConflictingApiKeys);
    }
    Ok(Some(first))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_matching_key_is_authorized() {
        let authorizer = ApiKeyAuthorizer::new(Some("s3cret"));

        for name in ["x-api-key", "X-API-Key", "X-Api-Key"] {
            let response = authorizer.authorize_map(&headers(&[(name, "s3cret")]));
            assert!(response.is_authorized, "header {name} should be accepted");
            assert_eq!(response.context.reason, AuthReason::Authorized);
        }
    }

    #[test]
    fn test_wrong_or_missing_key_is_denied() {
        let authorizer = ApiKeyAuthorizer::new(Some("s3cret"));

        let wrong = authorizer.authorize_map(&headers(&[("x-api-key", "guess")]));
        assert!(!wrong.is_authorized);
        assert_eq!(wrong.context.reason, AuthReason::InvalidApiKey);

        let missing = authorizer.authorize_map(&headers(&[("accept", "*/*")]));
        assert!(!missing.is_authorized);
        assert_eq!(missing.context.reason, AuthReason::InvalidApiKey);

        let empty = authorizer.authorize_map(&headers(&[("x-api-key", "")]));
        assert!(!empty.is_authorized);
    }

    #[test]
    fn test_unconfigured_key_denies_everything() {
        for authorizer in [ApiKeyAuthorizer::new(None), ApiKeyAuthorizer::new(Some(""))] {
            assert!(!authorizer.is_configured());
            let response = authorizer.authorize_map(&headers(&[("x-api-key", "")]));
            assert!(!response.is_authorized);
            assert_eq!(response.context.reason, AuthReason::InvalidApiKey);
        }
    }

    #[test]
    fn test_non_ascii_key_is_authorized() {
        let authorizer = ApiKeyAuthorizer::new(Some("clé-secrète"));

        let response = authorizer.authorize_map(&headers(&[("x-api-key", "clé-secrète")]));
        assert!(response.is_authorized);
        assert_eq!(response.context.reason, AuthReason::Authorized);

        let mut map = HeaderMap::new();
        map.insert(API_KEY_HEADER, HeaderValue::from_str("clé-secrète").unwrap());
        assert!(authorizer.authorize(&map).is_authorized);
    }

    #[test]
    fn test_unrelated_headers_do_not_matter() {
        let authorizer = ApiKeyAuthorizer::new(Some("s3cret"));

        let response = authorizer.authorize_map(&headers(&[
            ("bad header", "x"),
            ("x-trace", "a\nb"),
            ("x-api-key", "s3cret"),
        ]));
        assert!(response.is_authorized);
        assert_eq!(response.context.reason, AuthReason::Authorized);
    }

    #[test]
    fn test_lowercase_header_name_wins() {
        let authorizer = ApiKeyAuthorizer::new(Some("s3cret"));

        // Run several times since map iteration order varies between maps
        for _ in 0..16 {
            let allowed = authorizer.authorize_map(&headers(&[("X-API-Key", "guess"), ("x-api-key", "s3cret")]));
            assert!(allowed.is_authorized);

            let denied = authorizer.authorize_map(&headers(&[("X-API-Key", "s3cret"), ("x-api-key", "guess")]));
            assert!(!denied.is_authorized);
        }
    }

    #[test]
    fn test_conflicting_http_headers_fail_closed() {
        let authorizer = ApiKeyAuthorizer::new(Some("s3cret"));

        let mut map = HeaderMap::new();
        map.append(API_KEY_HEADER, HeaderValue::from_static("s3cret"));
        map.append(API_KEY_HEADER, HeaderValue::from_static("guess"));
        let response = authorizer.authorize(&map);
        assert!(!response.is_authorized);
        assert_eq!(response.context.reason, AuthReason::Error);

        let mut repeated = HeaderMap::new();
        repeated.append(API_KEY_HEADER, HeaderValue::from_static("s3cret"));
        repeated.append(API_KEY_HEADER, HeaderValue::from_static("s3cret"));
        assert!(authorizer.authorize(&repeated).is_authorized);
    }

    #[test]
    fn test_event_without_headers_is_denied() {
        let authorizer = ApiKeyAuthorizer::new(Some("s3cret"));
        let response = authorizer.authorize_event(&AuthorizerRequest::default());
        assert!(!response.is_authorized);
    }

    #[test]
    fn test_response_wire_format() {
        let json = serde_json::to_string(&AuthorizerResponse::deny(AuthReason::InvalidApiKey)).unwrap();
        assert_eq!(json, r#"{"isAuthorized":false,"context":{"reason":"invalid_api_key"}}"#);

        let json = serde_json::to_string(&AuthorizerResponse::allow()).unwrap();
        assert_eq!(json, r#"{"isAuthorized":true,"context":{"reason":"authorized"}}"#);
    }

    #[test]
    fn test_debug_does_not_expose_key() {
        let authorizer = ApiKeyAuthorizer::new(Some("s3cret"));
        assert!(!format!("{authorizer:?}").contains("s3cret"));
    }
}
