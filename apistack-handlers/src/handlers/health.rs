//! `GET /health`

use apistack_core::{success_headers, ApiResult, Handler, ProxyRequest, ProxyResponse, SuccessEnvelope};
use async_trait::async_trait;

use crate::services::HealthCheckService;

pub struct HealthCheckHandler {
    service: HealthCheckService,
}

impl HealthCheckHandler {
    pub fn new(service: HealthCheckService) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Handler for HealthCheckHandler {
    async fn handle(&self, _request: ProxyRequest) -> ApiResult<ProxyResponse> {
        let report = self.service.check_health()?;

        let mut headers = success_headers("GET, OPTIONS");
        headers.insert(
            "Cache-Control".to_string(),
            "no-store, no-cache, must-revalidate".into(),
        );
        ProxyResponse::json(200, headers, &SuccessEnvelope::new(report))
    }
}
