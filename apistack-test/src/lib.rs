//! Test utilities for apistack
//!
//! Provides utilities for end-to-end testing of the local gateway:
//! - Start the gateway in-process on a random port
//! - Seed the in-memory secret store
//! - Client helpers for calling the routes
//!
//! ## Usage
//!
//! ```rust,no_run
//! use apistack_test::TestServer;
//!
//! #[tokio::test]
//! async fn test_health() {
//!     let server = TestServer::builder().start().await.unwrap();
//!     let response = server.client().health().await.unwrap();
//!     assert_eq!(response.status, 200);
//! }
//! ```

pub mod client;
pub mod server;

pub use client::{ClientError, GatewayClient, GatewayResponse};
pub use server::{TestError, TestServer, TestServerBuilder};

/// Timeout for waiting on the server
pub const STARTUP_TIMEOUT_SECS: u64 = 10;

/// Install a test subscriber once; later calls are no-ops
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
