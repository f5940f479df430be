//! Secrets Manager demo service

use apistack_secrets::{SecretsClient, SecretsError};
use serde_json::Value;

/// Reads a secret and decodes it as JSON when it is JSON
#[derive(Debug, Clone)]
pub struct SecretsDemoService {
    client: SecretsClient,
}

impl SecretsDemoService {
    pub fn new(client: SecretsClient) -> Self {
        Self { client }
    }

    /// The secret as a JSON value, or as a plain string if it is not JSON
    pub async fn process(&self, secret_name: &str) -> Result<Value, SecretsError> {
        let secret = self.client.get_secret_value(secret_name).await?;
        Ok(serde_json::from_str(&secret).unwrap_or(Value::String(secret)))
    }
}
