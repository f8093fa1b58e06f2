//! Test server harness for E2E testing
//!
//! Provides TestBridgeServer for spawning real AuthBridge instances backed
//! by an in-memory directory.

use crate::fixtures::{test_config, test_directory};
use ab_service::config::Config;
use ab_service::directory::mock::FakeDirectory;
use ab_service::handlers::AppState;
use ab_service::routes;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Test harness for spawning the AuthBridge server in E2E tests
///
/// # Example
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_login_e2e() -> Result<(), anyhow::Error> {
///     let server = TestBridgeServer::spawn().await?;
///     let response = reqwest::Client::new()
///         .post(format!("{}/api/auth/login", server.url()))
///         .json(&json!({"username": "alice", "password": "alice-password"}))
///         .send()
///         .await?;
///
///     assert_eq!(response.status(), 200);
///     Ok(())
/// }
/// ```
pub struct TestBridgeServer {
    addr: SocketAddr,
    directory: FakeDirectory,
    config: Config,
    _handle: JoinHandle<()>,
}

impl TestBridgeServer {
    /// Spawn with the default fixtures ([`test_config`], [`test_directory`])
    pub async fn spawn() -> Result<Self, anyhow::Error> {
        Self::spawn_with(test_config(), test_directory()).await
    }

    /// Spawn a new server instance
    ///
    /// The server will:
    /// - Bind to a random available port (127.0.0.1:0)
    /// - Use `directory` for every bind and search
    /// - Start the HTTP server in the background
    pub async fn spawn_with(config: Config, directory: FakeDirectory) -> Result<Self, anyhow::Error> {
        let state = Arc::new(
            AppState::new(config.clone(), Arc::new(directory.clone()))
                .map_err(|e| anyhow::anyhow!("Failed to build app state: {}", e))?,
        );

        // The global recorder can only be installed once per process; later
        // servers get a standalone recorder.
        let metrics_handle = match routes::init_metrics_recorder() {
            Ok(handle) => handle,
            Err(_) => {
                use metrics_exporter_prometheus::PrometheusBuilder;
                PrometheusBuilder::new().build_recorder().handle()
            }
        };

        let app = routes::build_routes(state, metrics_handle);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        let handle = tokio::spawn(async move {
            let make_service = app.into_make_service_with_connect_info::<SocketAddr>();
            if let Err(e) = axum::serve(listener, make_service).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            directory,
            config,
            _handle: handle,
        })
    }

    /// Get the base URL of the test server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// The fake directory behind the server; switches flip live behavior.
    pub fn directory(&self) -> &FakeDirectory {
        &self.directory
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl Drop for TestBridgeServer {
    fn drop(&mut self) {
        self._handle.abort();
    }
}
