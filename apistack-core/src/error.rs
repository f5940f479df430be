//! Error taxonomy shared by every handler

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::validation::ValidationIssue;

/// Closed set of client-visible error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    ValidationError,
    NotFound,
    Unauthorized,
    Forbidden,
    InternalServerError,
    BadRequest,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::NotFound => "NOT_FOUND",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::InternalServerError => "INTERNAL_SERVER_ERROR",
            Self::BadRequest => "BAD_REQUEST",
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            Self::ValidationError | Self::BadRequest => 400,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::InternalServerError => 500,
        }
    }

    /// Message used when the error is raised without one
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::ValidationError => "Validation failed",
            Self::NotFound => "Resource not found",
            Self::Unauthorized => "Unauthorized",
            Self::Forbidden => "Forbidden",
            Self::InternalServerError => "Internal server error",
            Self::BadRequest => "Bad request",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed, recoverable failure raised by a handler or service.
///
/// The status code always follows from the kind. `details` can only be
/// attached to validation errors and `code` only to internal errors.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}: {message}")]
pub struct DomainError {
    kind: ErrorKind,
    status_code: u16,
    message: String,
    details: Option<Map<String, Value>>,
    code: Option<String>,
}

impl DomainError {
    /// Create an error of the given kind with its default message
    pub fn new(kind: ErrorKind) -> Self {
        Self::with_message(kind, kind.default_message())
    }

    fn with_message(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status_code: kind.http_status(),
            message: message.into(),
            details: None,
            code: None,
        }
    }

    pub fn validation(message: impl Into<String>, details: Map<String, Value>) -> Self {
        Self {
            details: Some(details),
            ..Self::with_message(ErrorKind::ValidationError, message)
        }
    }

    /// Validation failure carrying the field issues under `details.errors`
    pub fn validation_issues(issues: Vec<ValidationIssue>) -> Self {
        let errors = issues
            .into_iter()
            .map(|issue| {
                let mut entry = Map::new();
                entry.insert("path".to_string(), Value::String(issue.path));
                entry.insert("message".to_string(), Value::String(issue.message));
                Value::Object(entry)
            })
            .collect();

        let mut details = Map::new();
        details.insert("errors".to_string(), Value::Array(errors));
        Self::validation(ErrorKind::ValidationError.default_message(), details)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::with_message(ErrorKind::NotFound, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::with_message(ErrorKind::Unauthorized, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::with_message(ErrorKind::Forbidden, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::with_message(ErrorKind::BadRequest, message)
    }

    pub fn internal(message: impl Into<String>, code: Option<&str>) -> Self {
        Self {
            code: code.map(str::to_string),
            ..Self::with_message(ErrorKind::InternalServerError, message)
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn details(&self) -> Option<&Map<String, Value>> {
        self.details.as_ref()
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }
}

/// Failure returned by a handler.
///
/// `Unhandled` covers anything that is not a [`DomainError`]: collaborator
/// faults, serialization failures and the like. Its message never reaches
/// the client.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Unhandled(#[from] anyhow::Error),
}

impl ApiError {
    /// Wrap an arbitrary error as an unhandled failure
    pub fn unhandled<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Unhandled(anyhow::Error::new(error))
    }

    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            Self::Domain(e) => Some(e),
            Self::Unhandled(_) => None,
        }
    }
}

/// Result type returned by handlers and services
pub type ApiResult<T> = Result<T, ApiError>;
