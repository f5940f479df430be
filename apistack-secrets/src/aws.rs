//! AWS Secrets Manager backend

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_secretsmanager::{config::Region, error::DisplayErrorContext, Client};
use tracing::debug;

use crate::store::{SecretStore, SecretValue, SecretsError};

/// Region used when none is configured
pub const DEFAULT_REGION: &str = "us-east-1";

/// Secret store backed by AWS Secrets Manager
#[derive(Debug, Clone)]
pub struct AwsSecretStore {
    client: Client,
}

impl AwsSecretStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the default credential chain.
    ///
    /// `endpoint_url` points the client at a local emulator instead of AWS.
    pub async fn from_env(region: &str, endpoint_url: Option<&str>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest()).region(Region::new(region.to_string()));
        if let Some(url) = endpoint_url {
            loader = loader.endpoint_url(url);
        }
        let config = loader.load().await;

        debug!(region = %region, endpoint_url = ?endpoint_url, "Secrets Manager client configured");
        Self::new(Client::new(&config))
    }
}

#[async_trait]
impl SecretStore for AwsSecretStore {
    async fn fetch(&self, secret_id: &str) -> Result<Option<SecretValue>, SecretsError> {
        let output = self
            .client
            .get_secret_value()
            .secret_id(secret_id)
            .send()
            .await
            .map_err(|e| SecretsError::Backend(DisplayErrorContext(&e).to_string()))?;

        if let Some(value) = output.secret_string() {
            return Ok(Some(SecretValue::String(value.to_string())));
        }
        if let Some(blob) = output.secret_binary() {
            return Ok(Some(SecretValue::Binary(blob.as_ref().to_vec())));
        }
        Ok(None)
    }
}
