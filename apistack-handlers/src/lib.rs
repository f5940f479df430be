//! Handlers and services for apistack
//!
//! - `services`: health, greeting and secrets demo logic
//! - `handlers`: gateway-facing handlers composed with the error wrapper
//! - `metrics`: process uptime and memory figures for the health check

pub mod handlers;
pub mod metrics;
pub mod models;
pub mod services;

pub use handlers::{
    AuthorizerHandler, HandlerSet, HandlerSettings, HealthCheckHandler, NameHandler, SecretsDemoHandler,
    DEFAULT_SECRET_NAME,
};
pub use metrics::{MemoryUsage, MetricsError, MetricsSource, ProcessMetrics, ProcessSnapshot};
pub use models::{name_request_schema, NameRequest, NameResponse, SecretsDemoResponse};
pub use services::{HealthCheckService, HealthReport, HealthStatus, MemoryReport, NameService, SecretsDemoService};
