//! Request and response payloads

use apistack_core::{FieldRule, Schema};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

static NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z\s-]+$").expect("name pattern is a valid regex"));

/// Body of `POST /name`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameRequest {
    pub name: String,
}

/// Schema for [`NameRequest`]
pub fn name_request_schema() -> Schema {
    Schema::object().field(
        "name",
        FieldRule::string()
            .required("Name is required")
            .min_length(2, "Name must be at least 2 characters")
            .max_length(50, "Name must be at most 50 characters")
            .matches(NAME_PATTERN.clone(), "Name can only contain letters, spaces, and hyphens"),
    )
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameResponse {
    pub message: String,
    pub environment: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretsDemoResponse {
    pub secret_name: String,
    pub secret_value: Value,
    pub message: String,
}
