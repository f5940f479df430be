//! JSON envelopes returned to every caller

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ErrorKind;

/// Format a timestamp the way clients expect it: `2024-01-01T00:00:00.000Z`
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Current wall clock as an ISO-8601 string
pub fn now_iso() -> String {
    iso_timestamp(Utc::now())
}

/// Envelope for a successful response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessEnvelope<T> {
    success: bool,
    pub data: T,
    pub timestamp: String,
}

impl<T> SuccessEnvelope<T> {
    /// Wrap a payload, stamped with the current time
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
            timestamp: now_iso(),
        }
    }

    pub fn success(&self) -> bool {
        self.success
    }
}

/// Envelope for a failed response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    success: bool,
    pub error: ErrorBody,
}

impl ErrorEnvelope {
    pub fn new(error: ErrorBody) -> Self {
        Self {
            success: false,
            error,
        }
    }

    pub fn success(&self) -> bool {
        self.success
    }
}

/// The `error` member of a failed response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub timestamp: String,
    pub environment: String,
}
