//! Request authorizer entry point

use apistack_auth::{ApiKeyAuthorizer, AuthorizerRequest, AuthorizerResponse};
use tracing::info;

pub struct AuthorizerHandler {
    authorizer: ApiKeyAuthorizer,
}

impl AuthorizerHandler {
    pub fn new(authorizer: ApiKeyAuthorizer) -> Self {
        Self { authorizer }
    }

    pub fn authorizer(&self) -> &ApiKeyAuthorizer {
        &self.authorizer
    }

    pub async fn handle(&self, event: AuthorizerRequest) -> AuthorizerResponse {
        let response = self.authorizer.authorize_event(&event);
        info!(
            route_key = ?event.route_key,
            authorized = response.is_authorized,
            reason = ?response.context.reason,
            "Authorizer decision"
        );
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apistack_auth::AuthReason;
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_authorizer_event() {
        let handler = AuthorizerHandler::new(ApiKeyAuthorizer::new(Some("k3y")));
        let event = AuthorizerRequest {
            route_key: Some("GET /secrets-demo".to_string()),
            headers: Some(HashMap::from([("x-api-key".to_string(), "k3y".to_string())])),
            ..AuthorizerRequest::default()
        };

        let response = handler.handle(event).await;
        assert!(response.is_authorized);
        assert_eq!(response.context.reason, AuthReason::Authorized);
    }
}
