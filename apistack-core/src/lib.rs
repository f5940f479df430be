//! Core types for apistack handlers
//!
//! This crate provides the pieces every handler shares: the error taxonomy,
//! the JSON envelopes, the normalizer that turns failures into responses,
//! the wrapper that applies it, and the request validation pipeline.

pub mod envelope;
pub mod error;
pub mod event;
pub mod normalizer;
pub mod numbers;
pub mod validation;
pub mod wrapper;

pub use envelope::{iso_timestamp, now_iso, ErrorBody, ErrorEnvelope, SuccessEnvelope};
pub use error::{ApiError, ApiResult, DomainError, ErrorKind};
pub use event::{error_headers, success_headers, Headers, ProxyRequest, ProxyResponse, RequestContext};
pub use normalizer::{ErrorNormalizer, DEFAULT_ERROR_ENVIRONMENT, UNEXPECTED_ERROR_MESSAGE, UNHANDLED_ERROR_CODE};
pub use validation::{validate, validate_as, validate_request, FieldRule, Schema, ValidationIssue};
pub use wrapper::{handler_fn, wrap, ErrorWrapper, Handler, HandlerFn};
