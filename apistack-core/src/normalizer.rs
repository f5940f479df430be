//! Conversion of handler failures into client-facing error responses

use tracing::{error, warn};

use crate::envelope::{now_iso, ErrorBody, ErrorEnvelope};
use crate::error::{ApiError, ErrorKind};
use crate::event::{error_headers, ProxyResponse};

/// Message returned for every failure that is not a client error
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// Code attached to every genericized internal failure
pub const UNHANDLED_ERROR_CODE: &str = "UNHANDLED_ERROR";

/// Environment tag reported in error envelopes when none is configured
pub const DEFAULT_ERROR_ENVIRONMENT: &str = "development";

// Used only if the envelope itself cannot be serialized
const FALLBACK_BODY: &str = r#"{"success":false,"error":{"type":"INTERNAL_SERVER_ERROR","message":"An unexpected error occurred","code":"UNHANDLED_ERROR"}}"#;

/// Maps any [`ApiError`] to a status code and an [`ErrorEnvelope`].
///
/// Validation errors keep their details. Not-found, unauthorized, forbidden
/// and bad-request errors keep their message but never their details.
/// Everything else becomes a generic 500; the real error is written to the
/// log and nowhere else.
#[derive(Debug, Clone)]
pub struct ErrorNormalizer {
    environment: String,
}

impl Default for ErrorNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_ERROR_ENVIRONMENT)
    }
}

impl ErrorNormalizer {
    pub fn new(environment: impl Into<String>) -> Self {
        Self {
            environment: environment.into(),
        }
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn normalize(&self, error: &ApiError) -> (u16, ErrorEnvelope) {
        let (status, kind, message, details, code) = match error.as_domain() {
            Some(e) if e.kind() == ErrorKind::ValidationError => (
                e.status_code(),
                e.kind(),
                e.message().to_string(),
                e.details().cloned(),
                None,
            ),
            Some(e)
                if matches!(
                    e.kind(),
                    ErrorKind::NotFound | ErrorKind::Unauthorized | ErrorKind::Forbidden | ErrorKind::BadRequest
                ) =>
            {
                (e.status_code(), e.kind(), e.message().to_string(), None, None)
            }
            _ => (
                500,
                ErrorKind::InternalServerError,
                UNEXPECTED_ERROR_MESSAGE.to_string(),
                None,
                Some(UNHANDLED_ERROR_CODE.to_string()),
            ),
        };

        if status >= 500 {
            log_internal(error);
        } else {
            warn!(status, kind = %kind, message = %message, "Request failed");
        }

        let envelope = ErrorEnvelope::new(ErrorBody {
            kind,
            message,
            details,
            code,
            timestamp: now_iso(),
            environment: self.environment.clone(),
        });

        (status, envelope)
    }

    /// Normalize and render as a proxy response with the error headers
    pub fn to_response(&self, error: &ApiError) -> ProxyResponse {
        let (status, envelope) = self.normalize(error);
        let body = serde_json::to_string(&envelope).unwrap_or_else(|e| {
            error!(error = %e, "Failed to serialize error envelope");
            FALLBACK_BODY.to_string()
        });

        ProxyResponse::new(status, error_headers(), body)
    }
}

fn log_internal(error: &ApiError) {
    match error {
        // Debug output carries the cause chain and the backtrace when one was captured
        ApiError::Unhandled(e) => error!(error = ?e, "Unhandled error"),
        ApiError::Domain(e) => error!(
            kind = %e.kind(),
            message = %e.message(),
            code = ?e.code(),
            "Internal error"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DomainError;
    use crate::validation::ValidationIssue;
    use anyhow::anyhow;
    use serde_json::{json, Value};
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Run `f` with a subscriber that records every event as plain text
    fn captured_logs(f: impl FnOnce()) -> String {
        let buffer = LogBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, f);
        let bytes = buffer.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    fn body_json(response: &ProxyResponse) -> Value {
        serde_json::from_str(&response.body).unwrap()
    }

    #[test]
    fn test_validation_error_keeps_details_in_order() {
        let issues = vec![
            ValidationIssue::new("name", "Name must be at least 2 characters"),
            ValidationIssue::new("name", "Name can only contain letters, spaces, and hyphens"),
        ];
        let error = ApiError::from(DomainError::validation_issues(issues));

        let (status, envelope) = ErrorNormalizer::default().normalize(&error);

        assert_eq!(status, 400);
        assert_eq!(envelope.error.kind, ErrorKind::ValidationError);
        assert_eq!(envelope.error.message, "Validation failed");
        assert_eq!(
            Value::Object(envelope.error.details.unwrap()),
            json!({"errors": [
                {"path": "name", "message": "Name must be at least 2 characters"},
                {"path": "name", "message": "Name can only contain letters, spaces, and hyphens"},
            ]})
        );
        assert!(envelope.error.code.is_none());
    }

    #[test]
    fn test_fixed_message_kinds_drop_details() {
        let cases = [
            (DomainError::not_found("No such widget"), 404, ErrorKind::NotFound),
            (DomainError::unauthorized("Who are you"), 401, ErrorKind::Unauthorized),
            (DomainError::forbidden("Not yours"), 403, ErrorKind::Forbidden),
            (DomainError::bad_request("Invalid input"), 400, ErrorKind::BadRequest),
        ];

        for (domain, expected_status, expected_kind) in cases {
            let message = domain.message().to_string();
            let response = ErrorNormalizer::default().to_response(&domain.into());
            let body = body_json(&response);

            assert_eq!(response.status_code, expected_status);
            assert_eq!(body["success"], false);
            assert_eq!(body["error"]["type"], expected_kind.as_str());
            assert_eq!(body["error"]["message"], message.as_str());
            assert!(body["error"].get("details").is_none());
            assert!(body["error"].get("code").is_none());
        }
    }

    #[test]
    fn test_unknown_errors_are_genericized() {
        let error = ApiError::from(anyhow!("connection string postgres://admin:hunter2@db"));
        let response = ErrorNormalizer::default().to_response(&error);
        let body = body_json(&response);

        assert_eq!(response.status_code, 500);
        assert_eq!(body["error"]["type"], "INTERNAL_SERVER_ERROR");
        assert_eq!(body["error"]["code"], "UNHANDLED_ERROR");
        assert_eq!(body["error"]["message"], "An unexpected error occurred");
        assert!(!response.body.contains("hunter2"));
    }

    #[test]
    fn test_server_errors_log_full_diagnostic() {
        let error = ApiError::from(anyhow!("socket closed by peer").context("Failed to retrieve secret"));
        let mut response = None;

        let logs = captured_logs(|| response = Some(ErrorNormalizer::default().to_response(&error)));
        let response = response.unwrap();

        let line = logs.lines().find(|l| l.contains("Unhandled error")).unwrap();
        assert!(line.contains("ERROR"));
        assert!(logs.contains("Failed to retrieve secret"));
        assert!(logs.contains("socket closed by peer"));
        assert!(!response.body.contains("socket closed by peer"));
        assert!(!response.body.contains("Failed to retrieve secret"));
    }

    #[test]
    fn test_client_errors_log_at_warn() {
        let logs = captured_logs(|| {
            ErrorNormalizer::default().normalize(&DomainError::not_found("No such widget").into());
        });

        assert!(logs.contains("WARN"));
        assert!(logs.contains("No such widget"));
        assert!(!logs.contains("ERROR"));
    }

    #[test]
    fn test_internal_domain_error_is_genericized() {
        let error = ApiError::from(DomainError::internal("Failed to perform health check", Some("HEALTH_CHECK_FAILED")));
        let (status, envelope) = ErrorNormalizer::default().normalize(&error);

        assert_eq!(status, 500);
        assert_eq!(envelope.error.message, UNEXPECTED_ERROR_MESSAGE);
        assert_eq!(envelope.error.code.as_deref(), Some(UNHANDLED_ERROR_CODE));
    }

    #[test]
    fn test_environment_and_headers() {
        let response = ErrorNormalizer::new("prod").to_response(&DomainError::bad_request("nope").into());
        let body = body_json(&response);

        assert_eq!(body["error"]["environment"], "prod");
        assert!(body["error"]["timestamp"].as_str().unwrap().ends_with('Z'));
        assert_eq!(response.header("Content-Type").as_deref(), Some("application/json"));
        assert_eq!(response.header("Access-Control-Allow-Origin").as_deref(), Some("*"));
        assert_eq!(response.header("Access-Control-Allow-Credentials").as_deref(), Some("true"));
    }

    #[test]
    fn test_default_environment_is_development() {
        let (_, envelope) = ErrorNormalizer::default().normalize(&DomainError::forbidden("no").into());
        assert_eq!(envelope.error.environment, "development");
    }

    #[test]
    fn test_normalize_is_idempotent_apart_from_timestamp() {
        let normalizer = ErrorNormalizer::default();
        let error = ApiError::from(DomainError::validation_issues(vec![ValidationIssue::new("body", "Invalid JSON format")]));

        let (status_a, mut a) = normalizer.normalize(&error);
        let (status_b, mut b) = normalizer.normalize(&error);
        a.error.timestamp.clear();
        b.error.timestamp.clear();

        assert_eq!(status_a, status_b);
        assert_eq!(a, b);
    }
}
