//! Business logic behind the handlers

pub mod health;
pub mod name;
pub mod secrets_demo;

pub use health::{HealthCheckService, HealthReport, HealthStatus, MemoryReport};
pub use name::NameService;
pub use secrets_demo::SecretsDemoService;
