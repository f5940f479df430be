//! Secret store backends

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine};
use dashmap::DashMap;

/// Raw value held by a secret
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretValue {
    String(String),
    Binary(Vec<u8>),
}

/// Key to value lookup against a secret store.
///
/// `Ok(None)` means the secret exists but holds neither a string nor a
/// binary value.
#[async_trait]
pub trait SecretStore: Send + Sync {
    async fn fetch(&self, secret_id: &str) -> Result<Option<SecretValue>, SecretsError>;
}

/// Secret store errors
#[derive(Debug, thiserror::Error)]
pub enum SecretsError {
    #[error("Secret not found: {0}")]
    NotFound(String),

    #[error("No secret value found for {0}")]
    NoValue(String),

    #[error("Failed to retrieve secret: {0}")]
    Retrieval(String),

    #[error("Failed to parse secret as JSON: {0}")]
    Parse(String),

    #[error("Invalid secret value: {0}")]
    InvalidValue(String),

    #[error("Secret store error: {0}")]
    Backend(String),
}

/// In-memory secret store, used by the local gateway and in tests
#[derive(Debug, Default)]
pub struct InMemorySecretStore {
    /// Secret values indexed by name; `None` for a secret without a value
    secrets: DashMap<String, Option<SecretValue>>,
}

impl InMemorySecretStore {
    pub fn new() -> Self {
        Self {
            secrets: DashMap::new(),
        }
    }

    fn put(&self, name: &str, value: Option<SecretValue>) {
        self.secrets.insert(name.to_string(), value);
    }

    /// Create or replace a string secret
    pub fn put_string(&self, name: &str, value: impl Into<String>) {
        self.put(name, Some(SecretValue::String(value.into())));
    }

    /// Create or replace a binary secret
    pub fn put_binary(&self, name: &str, value: impl Into<Vec<u8>>) {
        self.put(name, Some(SecretValue::Binary(value.into())));
    }

    /// Create or replace a binary secret given as base64 text
    pub fn put_binary_base64(&self, name: &str, encoded: &str) -> Result<(), SecretsError> {
        let bytes = general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| SecretsError::InvalidValue(format!("{name}: {e}")))?;
        self.put_binary(name, bytes);
        Ok(())
    }

    /// Create a secret without any value
    pub fn put_empty(&self, name: &str) {
        self.put(name, None);
    }

    pub fn len(&self) -> usize {
        self.secrets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }
}

#[async_trait]
impl SecretStore for InMemorySecretStore {
    async fn fetch(&self, secret_id: &str) -> Result<Option<SecretValue>, SecretsError> {
        self.secrets
            .get(secret_id)
            .map(|secret| secret.value().clone())
            .ok_or_else(|| SecretsError::NotFound(secret_id.to_string()))
    }
}
