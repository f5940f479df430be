//! Lambda runtime entry points
//!
//! One binary serves every function; the function to run is chosen at
//! startup and the handlers are built once per execution environment.

use apistack_auth::{AuthorizerRequest, AuthorizerResponse};
use apistack_core::{ProxyRequest, ProxyResponse};
use apistack_handlers::HandlerSet;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use std::sync::Arc;
use tracing::info;

/// Deployable functions
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Function {
    Health,
    Name,
    SecretsDemo,
    Authorizer,
}

/// Run the Lambda runtime loop for one function
pub async fn run(function: Function, handlers: HandlerSet) -> Result<(), Error> {
    let handlers = Arc::new(handlers);
    info!(function = ?function, "Starting Lambda runtime");

    match function {
        Function::Health | Function::Name | Function::SecretsDemo => {
            lambda_runtime::run(service_fn(move |event: LambdaEvent<ProxyRequest>| {
                invoke(Arc::clone(&handlers), function, event.payload)
            }))
            .await
        }
        Function::Authorizer => {
            lambda_runtime::run(service_fn(move |event: LambdaEvent<AuthorizerRequest>| {
                authorize(Arc::clone(&handlers), event.payload)
            }))
            .await
        }
    }
}

async fn invoke(handlers: Arc<HandlerSet>, function: Function, request: ProxyRequest) -> Result<ProxyResponse, Error> {
    handle_proxy(&handlers, function, request)
        .await
        .ok_or_else(|| format!("{function:?} does not accept proxy events").into())
}

async fn authorize(handlers: Arc<HandlerSet>, event: AuthorizerRequest) -> Result<AuthorizerResponse, Error> {
    Ok(handlers.authorizer.handle(event).await)
}

/// Route a proxy event to the handler behind `function`.
/// `None` for the authorizer, which takes a different event.
pub async fn handle_proxy(handlers: &HandlerSet, function: Function, request: ProxyRequest) -> Option<ProxyResponse> {
    let response = match function {
        Function::Health => handlers.health.call(request).await,
        Function::Name => handlers.name.call(request).await,
        Function::SecretsDemo => handlers.secrets_demo.call(request).await,
        Function::Authorizer => return None,
    };
    Some(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use apistack_handlers::{HandlerSettings, ProcessMetrics};
    use apistack_secrets::{InMemorySecretStore, SecretsClient};
    use serde_json::{json, Value};

    fn handlers() -> HandlerSet {
        let settings = HandlerSettings {
            api_key: Some("k3y".to_string()),
            ..HandlerSettings::default()
        };
        HandlerSet::new(
            &settings,
            SecretsClient::from_store(InMemorySecretStore::new()),
            Arc::new(ProcessMetrics::new()),
        )
    }

    #[tokio::test]
    async fn test_name_event() {
        let event: ProxyRequest = serde_json::from_value(json!({
            "httpMethod": "POST",
            "path": "/name",
            "headers": null,
            "body": "{\"name\":\"Ada\"}",
            "requestContext": {"requestId": "abc-123"}
        }))
        .unwrap();

        let response = invoke(Arc::new(handlers()), Function::Name, event).await.unwrap();
        let wire = serde_json::to_value(&response).unwrap();
        let body: Value = serde_json::from_str(&response.body).unwrap();

        assert_eq!(wire["statusCode"], 200);
        assert_eq!(wire["headers"]["Access-Control-Allow-Methods"], "POST, OPTIONS");
        assert_eq!(body["data"]["message"], "Hello, Ada!");
    }

    #[tokio::test]
    async fn test_missing_secret_event() {
        let response = handle_proxy(&handlers(), Function::SecretsDemo, ProxyRequest::default())
            .await
            .unwrap();
        let wire = serde_json::to_value(&response).unwrap();

        assert_eq!(wire["statusCode"], 500);
        assert_eq!(wire["headers"]["Access-Control-Allow-Credentials"], true);
    }

    #[tokio::test]
    async fn test_authorizer_rejects_proxy_events() {
        assert!(handle_proxy(&handlers(), Function::Authorizer, ProxyRequest::default())
            .await
            .is_none());
        assert!(invoke(Arc::new(handlers()), Function::Authorizer, ProxyRequest::default())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_authorizer_event() {
        let event: AuthorizerRequest = serde_json::from_value(json!({
            "version": "2.0",
            "routeKey": "GET /secrets-demo",
            "headers": {"x-api-key": "wrong"}
        }))
        .unwrap();

        let response = authorize(Arc::new(handlers()), event).await.unwrap();
        assert_eq!(
            serde_json::to_value(response).unwrap(),
            json!({"isAuthorized": false, "context": {"reason": "invalid_api_key"}})
        );
    }
}
