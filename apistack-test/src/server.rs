//! Test server management

use apistack::{create_router, GatewayState};
use apistack_handlers::{HandlerSet, HandlerSettings, ProcessMetrics};
use apistack_secrets::{InMemorySecretStore, SecretsClient};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::info;

use crate::{GatewayClient, STARTUP_TIMEOUT_SECS};

/// Configures a [`TestServer`] before it starts
pub struct TestServerBuilder {
    settings: HandlerSettings,
    require_auth: bool,
    secrets: InMemorySecretStore,
}

impl Default for TestServerBuilder {
    fn default() -> Self {
        Self {
            settings: HandlerSettings::default(),
            require_auth: true,
            secrets: InMemorySecretStore::new(),
        }
    }
}

impl TestServerBuilder {
    pub fn api_key(mut self, key: &str) -> Self {
        self.settings.api_key = Some(key.to_string());
        self
    }

    /// Sets both environment tags, as `ENVIRONMENT` does
    pub fn environment(mut self, environment: &str) -> Self {
        self.settings.error_environment = environment.to_string();
        self.settings.payload_environment = environment.to_string();
        self
    }

    pub fn secret_name(mut self, name: &str) -> Self {
        self.settings.secret_name = name.to_string();
        self
    }

    pub fn secret(self, name: &str, value: &str) -> Self {
        self.secrets.put_string(name, value);
        self
    }

    pub fn without_auth(mut self) -> Self {
        self.require_auth = false;
        self
    }

    /// Start the gateway on a random local port and wait until it answers
    pub async fn start(self) -> Result<TestServer, TestError> {
        let handlers = HandlerSet::new(
            &self.settings,
            SecretsClient::from_store(self.secrets),
            Arc::new(ProcessMetrics::new()),
        );
        let app = create_router(GatewayState::new(handlers, self.require_auth));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| TestError::StartFailed(e.to_string()))?;
        let addr = listener
            .local_addr()
            .map_err(|e| TestError::StartFailed(e.to_string()))?;

        info!(addr = %addr, "Starting apistack test server");
        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let server = TestServer {
            task,
            addr,
            base_url: format!("http://{addr}"),
        };
        server.wait_ready().await?;
        Ok(server)
    }
}

/// A gateway running inside the test process
pub struct TestServer {
    task: JoinHandle<()>,
    addr: SocketAddr,
    base_url: String,
}

impl TestServer {
    pub fn builder() -> TestServerBuilder {
        TestServerBuilder::default()
    }

    async fn wait_ready(&self) -> Result<(), TestError> {
        let client = self.client();
        let start = std::time::Instant::now();

        while start.elapsed() < Duration::from_secs(STARTUP_TIMEOUT_SECS) {
            if let Ok(response) = client.health().await {
                if response.status == 200 {
                    info!(port = self.port(), "apistack ready");
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        Err(TestError::StartupTimeout)
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Get a client for calling the gateway
    pub fn client(&self) -> GatewayClient {
        GatewayClient::new(self.base_url.clone())
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        info!(port = self.port(), "Stopping apistack test server");
        self.task.abort();
    }
}

/// Errors that can occur with test server
#[derive(Debug, Error)]
pub enum TestError {
    #[error("Failed to start server: {0}")]
    StartFailed(String),

    #[error("Server startup timed out")]
    StartupTimeout,
}
