//! `GET /secrets-demo`

use apistack_core::{success_headers, ApiError, ApiResult, Handler, ProxyRequest, ProxyResponse, SuccessEnvelope};
use async_trait::async_trait;
use tracing::error;

use crate::models::SecretsDemoResponse;
use crate::services::SecretsDemoService;

/// Secret read when none is configured
pub const DEFAULT_SECRET_NAME: &str = "demo-secret";

pub struct SecretsDemoHandler {
    service: SecretsDemoService,
    secret_name: String,
}

impl SecretsDemoHandler {
    pub fn new(service: SecretsDemoService, secret_name: impl Into<String>) -> Self {
        Self {
            service,
            secret_name: secret_name.into(),
        }
    }
}

#[async_trait]
impl Handler for SecretsDemoHandler {
    async fn handle(&self, _request: ProxyRequest) -> ApiResult<ProxyResponse> {
        let secret_value = self.service.process(&self.secret_name).await.map_err(|e| {
            error!(secret_name = %self.secret_name, error = %e, "Failed to retrieve secret");
            ApiError::unhandled(e)
        })?;

        let data = SecretsDemoResponse {
            secret_name: self.secret_name.clone(),
            secret_value,
            message: "Successfully retrieved secret".to_string(),
        };
        ProxyResponse::json(200, success_headers("GET, OPTIONS"), &SuccessEnvelope::new(data))
    }
}
