//! `POST /name`

use apistack_core::{
    success_headers, validate_request, ApiResult, Handler, ProxyRequest, ProxyResponse, Schema, SuccessEnvelope,
};
use async_trait::async_trait;
use tracing::debug;

use crate::models::{name_request_schema, NameRequest};
use crate::services::NameService;

pub struct NameHandler {
    service: NameService,
    schema: Schema,
}

impl NameHandler {
    pub fn new(service: NameService) -> Self {
        Self {
            service,
            schema: name_request_schema(),
        }
    }
}

#[async_trait]
impl Handler for NameHandler {
    async fn handle(&self, request: ProxyRequest) -> ApiResult<ProxyResponse> {
        debug!(
            method = %request.http_method,
            path = %request.path,
            request_id = %request.request_context.request_id,
            body = ?request.body,
            "Name request"
        );

        let NameRequest { name } = validate_request(request.body.as_deref(), &self.schema)?;
        let result = self.service.process_name(&name);

        let mut headers = success_headers("POST, OPTIONS");
        headers.insert("Access-Control-Allow-Headers".to_string(), "Content-Type".into());
        ProxyResponse::json(200, headers, &SuccessEnvelope::new(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apistack_core::{wrap, ErrorNormalizer};
    use serde_json::{json, Value};

    fn handler() -> NameHandler {
        NameHandler::new(NameService::new("dev"))
    }

    #[tokio::test]
    async fn test_greets_valid_name() {
        let request = ProxyRequest::new("POST", "/name").with_body(r#"{"name":"Grace","role":"admin"}"#);
        let response = handler().handle(request).await.unwrap();
        let body: Value = serde_json::from_str(&response.body).unwrap();

        assert_eq!(response.status_code, 200);
        assert_eq!(response.header("Access-Control-Allow-Headers").as_deref(), Some("Content-Type"));
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["message"], "Hello, Grace!");
        assert_eq!(body["data"]["environment"], "dev");
    }

    #[tokio::test]
    async fn test_invalid_name_through_wrapper() {
        let wrapped = wrap(handler(), ErrorNormalizer::new("test"));
        let request = ProxyRequest::new("POST", "/name").with_body(r#"{"name":"1"}"#);

        let response = wrapped.call(request).await;
        let body: Value = serde_json::from_str(&response.body).unwrap();

        assert_eq!(response.status_code, 400);
        assert_eq!(body["error"]["type"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["environment"], "test");
        assert_eq!(
            body["error"]["details"],
            json!({"errors": [
                {"path": "name", "message": "Name must be at least 2 characters"},
                {"path": "name", "message": "Name can only contain letters, spaces, and hyphens"},
            ]})
        );
    }

    #[tokio::test]
    async fn test_malformed_json_through_wrapper() {
        let wrapped = wrap(handler(), ErrorNormalizer::default());
        let request = ProxyRequest::new("POST", "/name").with_body("name=Grace");

        let response = wrapped.call(request).await;
        let body: Value = serde_json::from_str(&response.body).unwrap();

        assert_eq!(response.status_code, 400);
        assert_eq!(
            body["error"]["details"]["errors"],
            json!([{"path": "body", "message": "Invalid JSON format"}])
        );
    }

    #[tokio::test]
    async fn test_missing_body_through_wrapper() {
        let wrapped = wrap(handler(), ErrorNormalizer::default());

        let response = wrapped.call(ProxyRequest::new("POST", "/name")).await;
        let body: Value = serde_json::from_str(&response.body).unwrap();

        assert_eq!(response.status_code, 400);
        assert_eq!(
            body["error"]["details"]["errors"],
            json!([{"path": "name", "message": "Name is required"}])
        );
    }
}
