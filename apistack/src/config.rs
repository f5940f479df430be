//! Configuration management

use apistack_core::DEFAULT_ERROR_ENVIRONMENT;
use apistack_handlers::{HandlerSettings, DEFAULT_SECRET_NAME};
use apistack_secrets::{
    AwsSecretStore, InMemorySecretStore, SecretsClient, DEFAULT_REGION,
};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::info;

/// Name of the optional configuration file, without extension
pub const CONFIG_FILE: &str = "apistack";

/// Environment tag in success payloads when `ENVIRONMENT` is unset
pub const DEFAULT_PAYLOAD_ENVIRONMENT: &str = "dev";

/// Environment variables read into the configuration
const ENV_KEYS: [&str; 5] = [
    "ENVIRONMENT",
    "API_KEY",
    "SECRET_NAME",
    "AWS_REGION",
    "SECRETS_ENDPOINT_URL",
];

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub secrets: SecretsConfig,

    /// Deployment stage, e.g. `dev` or `prod`
    #[serde(default)]
    pub environment: Option<String>,

    /// Key the authorizer expects in `x-api-key`
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_secret_name")]
    pub secret_name: String,

    #[serde(default = "default_region")]
    pub aws_region: String,

    #[serde(default)]
    pub secrets_endpoint_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SecretsConfig {
    /// Secrets preloaded into the in-memory store
    #[serde(default)]
    pub seed: Vec<SeedSecret>,
}

/// One `[[secrets.seed]]` entry. Names are kept as values rather than table
/// keys because configuration keys are case-folded.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SeedSecret {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub encoding: SeedEncoding,
}

/// How a seed value is stored
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeedEncoding {
    /// A string secret
    #[default]
    Text,
    /// A binary secret given as base64
    Base64,
}

/// Where secrets are read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SecretsBackend {
    /// In-memory store seeded from `[[secrets.seed]]`
    Memory,
    /// AWS Secrets Manager
    Aws,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            secrets: SecretsConfig::default(),
            environment: None,
            api_key: None,
            secret_name: default_secret_name(),
            aws_region: default_region(),
            secrets_endpoint_url: None,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

fn default_port() -> u16 {
    3000
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_secret_name() -> String {
    DEFAULT_SECRET_NAME.to_string()
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load() -> anyhow::Result<Self> {
        let env = ENV_KEYS
            .iter()
            .filter_map(|key| std::env::var(key).ok().map(|value| (key.to_string(), value)))
            .collect();
        Self::load_from(CONFIG_FILE, &env)
    }

    /// Load from the named file (if present) with `env` taking precedence.
    /// Empty variables count as unset.
    pub fn load_from(file: &str, env: &HashMap<String, String>) -> anyhow::Result<Self> {
        let mut builder = config::Config::builder().add_source(config::File::with_name(file).required(false));

        for key in ENV_KEYS {
            if let Some(value) = env.get(key).filter(|v| !v.is_empty()) {
                builder = builder.set_override(key.to_ascii_lowercase(), value.as_str())?;
            }
        }

        Ok(builder.build()?.try_deserialize::<AppConfig>()?)
    }

    fn stage(&self) -> Option<&str> {
        self.environment.as_deref().filter(|e| !e.is_empty())
    }

    /// Environment tag for error envelopes
    pub fn error_environment(&self) -> &str {
        self.stage().unwrap_or(DEFAULT_ERROR_ENVIRONMENT)
    }

    /// Environment tag for success payloads
    pub fn payload_environment(&self) -> &str {
        self.stage().unwrap_or(DEFAULT_PAYLOAD_ENVIRONMENT)
    }

    pub fn handler_settings(&self) -> HandlerSettings {
        HandlerSettings {
            error_environment: self.error_environment().to_string(),
            payload_environment: self.payload_environment().to_string(),
            secret_name: self.secret_name.clone(),
            api_key: self.api_key.clone().filter(|k| !k.is_empty()),
        }
    }

    /// Build the secrets client for the chosen backend
    pub async fn secrets_client(&self, backend: SecretsBackend) -> anyhow::Result<SecretsClient> {
        match backend {
            SecretsBackend::Memory => {
                let store = InMemorySecretStore::new();
                for seed in &self.secrets.seed {
                    match seed.encoding {
                        SeedEncoding::Text => store.put_string(&seed.name, seed.value.clone()),
                        SeedEncoding::Base64 => store.put_binary_base64(&seed.name, &seed.value)?,
                    }
                }
                info!(seeded = store.len(), "Using in-memory secret store");
                Ok(SecretsClient::from_store(store))
            }
            SecretsBackend::Aws => {
                info!(region = %self.aws_region, "Using AWS Secrets Manager");
                let store = AwsSecretStore::from_env(&self.aws_region, self.secrets_endpoint_url.as_deref()).await;
                Ok(SecretsClient::from_store(store))
            }
        }
    }
}
