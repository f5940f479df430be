//! Client for calling the local gateway

use reqwest::Client;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Status, headers and decoded JSON body of a gateway response
#[derive(Debug, Clone)]
pub struct GatewayResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Value,
}

impl GatewayResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }
}

/// Client for the gateway routes
#[derive(Debug, Clone)]
pub struct GatewayClient {
    base_url: String,
    client: Client,
    api_key: Option<String>,
}

impl GatewayClient {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            client: Client::new(),
            api_key: None,
        }
    }

    /// Send `x-api-key` with every request
    pub fn with_api_key(mut self, key: &str) -> Self {
        self.api_key = Some(key.to_string());
        self
    }

    pub async fn health(&self) -> Result<GatewayResponse, ClientError> {
        self.send(self.client.get(self.url("/health"))).await
    }

    /// POST `/name` with a raw body
    pub async fn name_raw(&self, body: impl Into<String>) -> Result<GatewayResponse, ClientError> {
        let request = self
            .client
            .post(self.url("/name"))
            .header("Content-Type", "application/json")
            .body(body.into());
        self.send(request).await
    }

    pub async fn name(&self, name: &str) -> Result<GatewayResponse, ClientError> {
        self.name_raw(serde_json::json!({ "name": name }).to_string()).await
    }

    pub async fn secrets_demo(&self) -> Result<GatewayResponse, ClientError> {
        self.send(self.client.get(self.url("/secrets-demo"))).await
    }

    pub async fn get(&self, path: &str) -> Result<GatewayResponse, ClientError> {
        self.send(self.client.get(self.url(path))).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, mut request: reqwest::RequestBuilder) -> Result<GatewayResponse, ClientError> {
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
            .collect();
        let text = response.text().await?;
        let body = serde_json::from_str(&text).map_err(|e| ClientError::ParseError(format!("{e}: {text}")))?;

        Ok(GatewayResponse { status, headers, body })
    }
}

/// Client errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Parse error: {0}")]
    ParseError(String),
}
