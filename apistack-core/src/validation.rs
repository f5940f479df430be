//! Declarative request-body validation
//!
//! A [`Schema`] is an ordered list of fields, each with a [`FieldRule`]. Every
//! field is checked in one pass and all violations are collected, so a client
//! sees every problem with its request at once. Fields the schema does not
//! declare are dropped from the validated value.
//!
//! Absent values (missing or `null`) only ever fail `required`; the remaining
//! checks apply to present values.

use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

use crate::error::DomainError;

/// One failing field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub path: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldType {
    String,
    Number,
    Boolean,
}

impl FieldType {
    fn name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
        }
    }

    /// Convert a present value to this type, the way a lenient form parser would
    fn coerce(self, value: &Value) -> Option<Value> {
        match (self, value) {
            (Self::String, Value::String(_)) => Some(value.clone()),
            (Self::String, Value::Number(n)) => Some(Value::String(n.to_string())),
            (Self::String, Value::Bool(b)) => Some(Value::String(b.to_string())),
            (Self::Number, Value::Number(_)) => Some(value.clone()),
            (Self::Number, Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number),
            (Self::Boolean, Value::Bool(_)) => Some(value.clone()),
            (Self::Boolean, Value::String(s)) => match s.as_str() {
                "true" => Some(Value::Bool(true)),
                "false" => Some(Value::Bool(false)),
                _ => None,
            },
            _ => None,
        }
    }
}

type Predicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

#[derive(Clone)]
enum Check {
    MinLength(usize, String),
    MaxLength(usize, String),
    Matches(Regex, String),
    Min(f64, String),
    Max(f64, String),
    OneOf(Vec<Value>, String),
    Test(Predicate, String),
}

impl Check {
    fn message(&self) -> &str {
        match self {
            Self::MinLength(_, m)
            | Self::MaxLength(_, m)
            | Self::Matches(_, m)
            | Self::Min(_, m)
            | Self::Max(_, m)
            | Self::OneOf(_, m)
            | Self::Test(_, m) => m,
        }
    }

    fn passes(&self, value: &Value) -> bool {
        match self {
            Self::MinLength(min, _) => value.as_str().map_or(true, |s| s.chars().count() >= *min),
            Self::MaxLength(max, _) => value.as_str().map_or(true, |s| s.chars().count() <= *max),
            Self::Matches(re, _) => value.as_str().map_or(true, |s| re.is_match(s)),
            Self::Min(min, _) => value.as_f64().map_or(true, |n| n >= *min),
            Self::Max(max, _) => value.as_f64().map_or(true, |n| n <= *max),
            Self::OneOf(allowed, _) => allowed.contains(value),
            Self::Test(predicate, _) => predicate(value),
        }
    }
}

impl fmt::Debug for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MinLength(n, _) => write!(f, "MinLength({n})"),
            Self::MaxLength(n, _) => write!(f, "MaxLength({n})"),
            Self::Matches(re, _) => write!(f, "Matches({})", re.as_str()),
            Self::Min(n, _) => write!(f, "Min({n})"),
            Self::Max(n, _) => write!(f, "Max({n})"),
            Self::OneOf(values, _) => write!(f, "OneOf({values:?})"),
            Self::Test(_, message) => write!(f, "Test({message:?})"),
        }
    }
}

/// Rules for a single field
#[derive(Debug, Clone)]
pub struct FieldRule {
    field_type: FieldType,
    required: Option<String>,
    checks: Vec<Check>,
}

impl FieldRule {
    fn of(field_type: FieldType) -> Self {
        Self {
            field_type,
            required: None,
            checks: Vec::new(),
        }
    }

    pub fn string() -> Self {
        Self::of(FieldType::String)
    }

    pub fn number() -> Self {
        Self::of(FieldType::Number)
    }

    pub fn boolean() -> Self {
        Self::of(FieldType::Boolean)
    }

    /// Fail when the field is missing, `null`, or an empty string
    pub fn required(mut self, message: impl Into<String>) -> Self {
        self.required = Some(message.into());
        self
    }

    pub fn min_length(mut self, min: usize, message: impl Into<String>) -> Self {
        self.checks.push(Check::MinLength(min, message.into()));
        self
    }

    pub fn max_length(mut self, max: usize, message: impl Into<String>) -> Self {
        self.checks.push(Check::MaxLength(max, message.into()));
        self
    }

    /// The pattern must match the whole value, so anchor it (`^...$`)
    pub fn matches(mut self, pattern: Regex, message: impl Into<String>) -> Self {
        self.checks.push(Check::Matches(pattern, message.into()));
        self
    }

    pub fn min(mut self, min: f64, message: impl Into<String>) -> Self {
        self.checks.push(Check::Min(min, message.into()));
        self
    }

    pub fn max(mut self, max: f64, message: impl Into<String>) -> Self {
        self.checks.push(Check::Max(max, message.into()));
        self
    }

    pub fn one_of(mut self, allowed: Vec<Value>, message: impl Into<String>) -> Self {
        self.checks.push(Check::OneOf(allowed, message.into()));
        self
    }

    /// Custom predicate over the coerced value
    pub fn test<F>(mut self, message: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.checks.push(Check::Test(Arc::new(predicate), message.into()));
        self
    }

    /// Check one field, appending issues. Returns the coerced value if present.
    fn evaluate(&self, path: &str, raw: Option<&Value>, issues: &mut Vec<ValidationIssue>) -> Option<Value> {
        let raw = match raw {
            None | Some(Value::Null) => {
                if let Some(message) = &self.required {
                    issues.push(ValidationIssue::new(path, message.clone()));
                }
                return None;
            }
            Some(raw) => raw,
        };

        let Some(value) = self.field_type.coerce(raw) else {
            issues.push(ValidationIssue::new(
                path,
                format!("{path} must be a `{}` type", self.field_type.name()),
            ));
            return None;
        };

        if let (Some(message), Value::String(s)) = (&self.required, &value) {
            if s.is_empty() {
                issues.push(ValidationIssue::new(path, message.clone()));
            }
        }

        for check in &self.checks {
            if !check.passes(&value) {
                issues.push(ValidationIssue::new(path, check.message()));
            }
        }

        Some(value)
    }
}

/// Object schema with fields evaluated in declaration order
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<(String, FieldRule)>,
}

impl Schema {
    pub fn object() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, rule: FieldRule) -> Self {
        self.fields.push((name.into(), rule));
        self
    }

    /// Validate an object, returning only the declared fields
    pub fn check(&self, input: &Map<String, Value>) -> Result<Map<String, Value>, Vec<ValidationIssue>> {
        let mut issues = Vec::new();
        let mut output = Map::new();

        for (name, rule) in &self.fields {
            if let Some(value) = rule.evaluate(name, input.get(name), &mut issues) {
                output.insert(name.clone(), value);
            }
        }

        if issues.is_empty() {
            Ok(output)
        } else {
            Err(issues)
        }
    }
}

/// Validate a structural value against a schema
pub fn validate(input: &Value, schema: &Schema) -> Result<Value, DomainError> {
    let Value::Object(object) = input else {
        return Err(DomainError::validation_issues(vec![ValidationIssue::new(
            "body",
            "body must be a `object` type",
        )]));
    };

    schema
        .check(object)
        .map(Value::Object)
        .map_err(DomainError::validation_issues)
}

/// Validate and convert into a typed value
pub fn validate_as<T: DeserializeOwned>(input: &Value, schema: &Schema) -> Result<T, DomainError> {
    let validated = validate(input, schema)?;
    serde_json::from_value(validated).map_err(|e| {
        tracing::error!(error = %e, "Validated payload does not match its target type");
        DomainError::internal("Validated payload does not match its target type", Some("SCHEMA_MISMATCH"))
    })
}

/// Parse a raw request body and validate it.
///
/// A missing or empty body is treated as `{}` so that required-field
/// messages are reported instead of a parse failure.
pub fn validate_request<T: DeserializeOwned>(raw_body: Option<&str>, schema: &Schema) -> Result<T, DomainError> {
    let input = match raw_body {
        None | Some("") => Value::Object(Map::new()),
        Some(raw) => serde_json::from_str(raw).map_err(|_| {
            DomainError::validation_issues(vec![ValidationIssue::new("body", "Invalid JSON format")])
        })?,
    };

    validate_as(&input, schema)
}
