//! API Gateway proxy event and result types

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

use crate::error::{ApiError, ApiResult};

/// Incoming proxy event (REST API payload format)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProxyRequest {
    #[serde(deserialize_with = "null_as_default")]
    pub http_method: String,
    #[serde(deserialize_with = "null_as_default")]
    pub path: String,
    #[serde(deserialize_with = "null_as_default")]
    pub headers: HashMap<String, String>,
    pub query_string_parameters: Option<HashMap<String, String>>,
    pub path_parameters: Option<HashMap<String, String>>,
    pub body: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub is_base64_encoded: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub request_context: RequestContext,
}

impl ProxyRequest {
    pub fn new(http_method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            http_method: http_method.into(),
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

// The gateway sends `null` for empty collections
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestContext {
    pub request_id: String,
    pub stage: String,
}

/// Response headers; values are JSON so boolean headers keep their type
pub type Headers = BTreeMap<String, Value>;

/// Headers for a successful response allowing the given methods
pub fn success_headers(methods: &str) -> Headers {
    let mut headers = Headers::new();
    headers.insert("Content-Type".to_string(), Value::from("application/json"));
    headers.insert("Access-Control-Allow-Origin".to_string(), Value::from("*"));
    headers.insert("Access-Control-Allow-Methods".to_string(), Value::from(methods));
    headers
}

/// Headers attached to every error response
pub fn error_headers() -> Headers {
    let mut headers = Headers::new();
    headers.insert("Content-Type".to_string(), Value::from("application/json"));
    headers.insert("Access-Control-Allow-Origin".to_string(), Value::from("*"));
    headers.insert("Access-Control-Allow-Credentials".to_string(), Value::Bool(true));
    headers
}

/// Proxy integration result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyResponse {
    pub status_code: u16,
    #[serde(default)]
    pub headers: Headers,
    pub body: String,
}

impl ProxyResponse {
    pub fn new(status_code: u16, headers: Headers, body: impl Into<String>) -> Self {
        Self {
            status_code,
            headers,
            body: body.into(),
        }
    }

    /// Serialize `body` as the JSON response body
    pub fn json<T: Serialize>(status_code: u16, headers: Headers, body: &T) -> ApiResult<Self> {
        let body = serde_json::to_string(body).map_err(ApiError::unhandled)?;
        Ok(Self::new(status_code, headers, body))
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Header value rendered as text, the way it goes out on the wire
    pub fn header(&self, name: &str) -> Option<String> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proxy_request_deserializes_partial_event() {
        let event: ProxyRequest = serde_json::from_str(
            r#"{"httpMethod":"POST","path":"/name","headers":{"Content-Type":"application/json"},"body":"{\"name\":\"Jo\"}","requestContext":{"requestId":"abc"}}"#,
        )
        .unwrap();

        assert_eq!(event.http_method, "POST");
        assert_eq!(event.body.as_deref(), Some(r#"{"name":"Jo"}"#));
        assert_eq!(event.header("content-type"), Some("application/json"));
        assert_eq!(event.request_context.request_id, "abc");
        assert!(event.query_string_parameters.is_none());
    }

    #[test]
    fn test_empty_event_is_accepted() {
        let event: ProxyRequest = serde_json::from_str("{}").unwrap();
        assert!(event.body.is_none());
        assert!(event.headers.is_empty());
    }

    #[test]
    fn test_null_headers_are_treated_as_empty() {
        let event: ProxyRequest =
            serde_json::from_str(r#"{"httpMethod":"GET","headers":null,"body":null}"#).unwrap();
        assert!(event.headers.is_empty());
        assert!(event.body.is_none());
    }

    #[test]
    fn test_error_headers_keep_boolean_credentials() {
        let response = ProxyResponse::new(500, error_headers(), "{}");
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["statusCode"], 500);
        assert_eq!(value["headers"]["Access-Control-Allow-Credentials"], true);
        assert_eq!(response.header("access-control-allow-credentials").as_deref(), Some("true"));
    }

    #[test]
    fn test_success_headers() {
        let headers = success_headers("GET, OPTIONS");
        assert_eq!(headers["Access-Control-Allow-Methods"], "GET, OPTIONS");
        assert_eq!(headers["Access-Control-Allow-Origin"], "*");
        assert_eq!(headers["Content-Type"], "application/json");
    }
}
