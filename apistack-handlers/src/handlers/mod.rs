//! Gateway-facing handlers
//!
//! Each handler implements [`Handler`](apistack_core::Handler) and is served
//! behind an [`ErrorWrapper`], so callers always get a response back.

pub mod authorizer;
pub mod health;
pub mod name;
pub mod secrets_demo;

use apistack_auth::ApiKeyAuthorizer;
use apistack_core::{wrap, ErrorNormalizer, ErrorWrapper};
use apistack_secrets::SecretsClient;
use std::sync::Arc;

use crate::metrics::MetricsSource;
use crate::services::{HealthCheckService, NameService, SecretsDemoService};

pub use authorizer::AuthorizerHandler;
pub use health::HealthCheckHandler;
pub use name::NameHandler;
pub use secrets_demo::{SecretsDemoHandler, DEFAULT_SECRET_NAME};

/// Inputs shared by every handler
#[derive(Debug, Clone)]
pub struct HandlerSettings {
    /// Environment tag in error envelopes
    pub error_environment: String,
    /// Environment tag in success payloads
    pub payload_environment: String,
    pub secret_name: String,
    pub api_key: Option<String>,
}

impl Default for HandlerSettings {
    fn default() -> Self {
        Self {
            error_environment: apistack_core::DEFAULT_ERROR_ENVIRONMENT.to_string(),
            payload_environment: "dev".to_string(),
            secret_name: DEFAULT_SECRET_NAME.to_string(),
            api_key: None,
        }
    }
}

/// All handlers, built once and shared across requests
pub struct HandlerSet {
    pub health: ErrorWrapper<HealthCheckHandler>,
    pub name: ErrorWrapper<NameHandler>,
    pub secrets_demo: ErrorWrapper<SecretsDemoHandler>,
    pub authorizer: AuthorizerHandler,
}

impl HandlerSet {
    pub fn new(settings: &HandlerSettings, secrets: SecretsClient, metrics: Arc<dyn MetricsSource>) -> Self {
        let normalizer = ErrorNormalizer::new(settings.error_environment.clone());
        let environment = settings.payload_environment.clone();

        Self {
            health: wrap(
                HealthCheckHandler::new(HealthCheckService::new(environment.clone(), metrics)),
                normalizer.clone(),
            ),
            name: wrap(NameHandler::new(NameService::new(environment)), normalizer.clone()),
            secrets_demo: wrap(
                SecretsDemoHandler::new(SecretsDemoService::new(secrets), settings.secret_name.clone()),
                normalizer,
            ),
            authorizer: AuthorizerHandler::new(ApiKeyAuthorizer::new(settings.api_key.as_deref())),
        }
    }
}
