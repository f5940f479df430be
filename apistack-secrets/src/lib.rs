//! Secrets retrieval for apistack
//!
//! Provides a [`SecretsClient`] over a pluggable [`SecretStore`]:
//! - AWS Secrets Manager via the AWS SDK
//! - An in-memory store for local runs and tests

pub mod aws;
pub mod client;
pub mod store;

pub use aws::{AwsSecretStore, DEFAULT_REGION};
pub use client::SecretsClient;
pub use store::{InMemorySecretStore, SecretStore, SecretValue, SecretsError};
