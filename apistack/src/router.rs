//! Local API gateway
//!
//! Serves the handlers over HTTP the way the deployed gateway does: proxy
//! events in, proxy results out, with the API-key authorizer in front of the
//! protected routes.

use apistack_core::{ProxyRequest, ProxyResponse, RequestContext};
use apistack_handlers::HandlerSet;
use axum::{
    body::Body,
    extract::{Query, State},
    Extension,
    http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

/// Stage name reported in request contexts
pub const LOCAL_STAGE: &str = "$default";

/// Shared state for the gateway router
pub struct GatewayState {
    handlers: HandlerSet,
    require_auth: bool,
}

impl GatewayState {
    pub fn new(handlers: HandlerSet, require_auth: bool) -> Self {
        Self { handlers, require_auth }
    }

    /// `Some(response)` when the authorizer rejects the request
    fn deny(&self, headers: &HeaderMap) -> Option<Response> {
        if !self.require_auth {
            return None;
        }
        let decision = self.handlers.authorizer.authorizer().authorize(headers);
        if decision.is_authorized {
            return None;
        }
        info!(reason = ?decision.context.reason, "Request denied by authorizer");
        Some(gateway_message(StatusCode::FORBIDDEN, "Forbidden"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Health,
    Name,
    SecretsDemo,
}

impl Route {
    /// Routes behind the authorizer
    fn protected(self) -> bool {
        !matches!(self, Route::Health)
    }
}

/// Create the gateway router
pub fn create_router(state: GatewayState) -> Router {
    let shared_state = Arc::new(state);

    Router::new()
        .route("/health", get(handle).layer(Extension(Route::Health)))
        .route("/name", post(handle).layer(Extension(Route::Name)))
        .route("/secrets-demo", get(handle).layer(Extension(Route::SecretsDemo)))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(shared_state)
}

/// Turn the HTTP request into a proxy event and run the route's handler
async fn handle(
    State(state): State<Arc<GatewayState>>,
    Extension(route): Extension<Route>,
    method: Method,
    uri: Uri,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if route.protected() {
        if let Some(denied) = state.deny(&headers) {
            return denied;
        }
    }
    let request = to_proxy_request(&method, &uri, query, &headers, &body);
    dispatch(&state, route, request).await
}

async fn not_found(method: Method, uri: Uri) -> Response {
    debug!(method = %method, path = %uri.path(), "No route");
    gateway_message(StatusCode::NOT_FOUND, "Not Found")
}

async fn dispatch(state: &GatewayState, route: Route, request: ProxyRequest) -> Response {
    let handlers = &state.handlers;
    debug!(route = ?route, request_id = %request.request_context.request_id, "Invoking handler");

    let response = match route {
        Route::Health => handlers.health.call(request).await,
        Route::Name => handlers.name.call(request).await,
        Route::SecretsDemo => handlers.secrets_demo.call(request).await,
    };
    to_http_response(response)
}

/// Build the proxy event the gateway would send for this request
fn to_proxy_request(
    method: &Method,
    uri: &Uri,
    query: HashMap<String, String>,
    headers: &HeaderMap,
    body: &Bytes,
) -> ProxyRequest {
    let headers = headers
        .iter()
        .filter_map(|(name, value)| {
            std::str::from_utf8(value.as_bytes())
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();

    ProxyRequest {
        http_method: method.as_str().to_string(),
        path: uri.path().to_string(),
        headers,
        query_string_parameters: (!query.is_empty()).then_some(query),
        path_parameters: None,
        body: (!body.is_empty()).then(|| String::from_utf8_lossy(body).into_owned()),
        is_base64_encoded: false,
        request_context: RequestContext {
            request_id: uuid::Uuid::new_v4().to_string(),
            stage: LOCAL_STAGE.to_string(),
        },
    }
}

/// Turn a proxy result into an HTTP response
fn to_http_response(proxy: ProxyResponse) -> Response {
    let status = StatusCode::from_u16(proxy.status_code).unwrap_or_else(|_| {
        warn!(status_code = proxy.status_code, "Handler returned an invalid status code");
        StatusCode::INTERNAL_SERVER_ERROR
    });

    let mut response = Response::new(Body::from(proxy.body.clone()));
    *response.status_mut() = status;

    for name in proxy.headers.keys() {
        let Some(value) = proxy.header(name) else {
            continue;
        };
        match (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(&value)) {
            (Ok(name), Ok(value)) => {
                response.headers_mut().insert(name, value);
            }
            _ => warn!(header = %name, "Dropping invalid response header"),
        }
    }
    response
}

fn gateway_message(status: StatusCode, message: &str) -> Response {
    let body = serde_json::json!({ "message": message });
    (status, [(header::CONTENT_TYPE, "application/json")], body.to_string()).into_response()
}
