//! Secrets retrieval client shared by every invocation

use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::error;

use crate::store::{SecretStore, SecretValue, SecretsError};

/// Reads secrets from a [`SecretStore`].
///
/// Construct it once at startup and clone it into whatever needs it; clones
/// share the same store.
#[derive(Clone)]
pub struct SecretsClient {
    store: Arc<dyn SecretStore>,
}

impl std::fmt::Debug for SecretsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretsClient").finish_non_exhaustive()
    }
}

impl SecretsClient {
    pub fn new(store: Arc<dyn SecretStore>) -> Self {
        Self { store }
    }

    pub fn from_store<S: SecretStore + 'static>(store: S) -> Self {
        Self::new(Arc::new(store))
    }

    /// Fetch a secret as text. Binary secrets are decoded as UTF-8.
    pub async fn get_secret_value(&self, secret_id: &str) -> Result<String, SecretsError> {
        let result = match self.store.fetch(secret_id).await {
            Ok(Some(SecretValue::String(value))) => Ok(value),
            Ok(Some(SecretValue::Binary(bytes))) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
            Ok(None) => Err(SecretsError::NoValue(secret_id.to_string())),
            Err(e) => Err(e),
        };

        result.map_err(|e| {
            error!(secret_id = %secret_id, error = %e, "Error retrieving secret");
            SecretsError::Retrieval(e.to_string())
        })
    }

    /// Fetch a secret and decode it as JSON
    pub async fn get_secret_json<T: DeserializeOwned>(&self, secret_id: &str) -> Result<T, SecretsError> {
        let value = self.get_secret_value(secret_id).await?;
        serde_json::from_str(&value).map_err(|e| {
            error!(secret_id = %secret_id, error = %e, "Error parsing secret as JSON");
            SecretsError::Parse(e.to_string())
        })
    }
}
