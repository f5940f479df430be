//! apistack - serverless API handlers
//!
//! The handlers run either inside the Lambda runtime or behind a local
//! gateway that mirrors the deployed routes and authorizer.

pub mod config;
pub mod lambda;
pub mod router;
pub mod telemetry;

pub use crate::config::{AppConfig, SecretsBackend, SeedEncoding, SeedSecret};
pub use lambda::Function;
pub use router::{create_router, GatewayState};
