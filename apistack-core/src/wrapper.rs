//! Handler trait and the error boundary around it

use async_trait::async_trait;
use std::future::Future;

use crate::error::ApiResult;
use crate::event::{ProxyRequest, ProxyResponse};
use crate::normalizer::ErrorNormalizer;

/// A request handler. Success responses are built by the handler itself;
/// failures are returned as [`ApiError`](crate::ApiError) values.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, request: ProxyRequest) -> ApiResult<ProxyResponse>;
}

/// Handler backed by an async function
#[derive(Clone)]
pub struct HandlerFn<F> {
    f: F,
}

/// Turn an async function into a [`Handler`]
pub fn handler_fn<F, Fut>(f: F) -> HandlerFn<F>
where
    F: Fn(ProxyRequest) -> Fut + Send + Sync,
    Fut: Future<Output = ApiResult<ProxyResponse>> + Send,
{
    HandlerFn { f }
}

#[async_trait]
impl<F, Fut> Handler for HandlerFn<F>
where
    F: Fn(ProxyRequest) -> Fut + Send + Sync,
    Fut: Future<Output = ApiResult<ProxyResponse>> + Send,
{
    async fn handle(&self, request: ProxyRequest) -> ApiResult<ProxyResponse> {
        (self.f)(request).await
    }
}

/// Runs a handler once and turns any failure into an error response.
/// Successful responses are returned untouched.
pub struct ErrorWrapper<H> {
    handler: H,
    normalizer: ErrorNormalizer,
}

impl<H: Handler> ErrorWrapper<H> {
    pub fn new(handler: H, normalizer: ErrorNormalizer) -> Self {
        Self { handler, normalizer }
    }

    pub async fn call(&self, request: ProxyRequest) -> ProxyResponse {
        match self.handler.handle(request).await {
            Ok(response) => response,
            Err(error) => self.normalizer.to_response(&error),
        }
    }
}

#[async_trait]
impl<H: Handler> Handler for ErrorWrapper<H> {
    async fn handle(&self, request: ProxyRequest) -> ApiResult<ProxyResponse> {
        Ok(self.call(request).await)
    }
}

/// Wrap a handler with the error boundary
pub fn wrap<H: Handler>(handler: H, normalizer: ErrorNormalizer) -> ErrorWrapper<H> {
    ErrorWrapper::new(handler, normalizer)
}
