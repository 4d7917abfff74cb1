//! Timer API server implementation
//!
//! Wires the controller into the axum router and serves it over plain HTTP,
//! or over HTTPS when a certificate and key are configured.

use std::path::Path;
use std::time::{Duration, Instant};

use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::controller::TimerController;

use super::api::create_router;
use super::config::ServerConfig;

/// How long in-flight HTTPS connections may drain after shutdown is requested
const TLS_SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

// ============================================================================
// App State
// ============================================================================

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Timer lifecycle controller
    pub controller: TimerController,

    /// Server start time
    pub start_time: Instant,

    /// Configuration
    pub config: ServerConfig,
}

// ============================================================================
// Timer Server
// ============================================================================

/// HTTP server for the timer API
pub struct TimerServer {
    config: ServerConfig,
    state: AppState,
}

impl TimerServer {
    /// Create a new server around `controller`
    pub fn new(config: ServerConfig, controller: TimerController) -> Result<Self, ServerError> {
        config
            .validate()
            .map_err(|e| ServerError::ConfigError(e.to_string()))?;

        let state = AppState {
            controller,
            start_time: Instant::now(),
            config: config.clone(),
        };

        Ok(Self { config, state })
    }

    /// Build the router with all routes
    pub fn build_router(&self) -> Router {
        let mut router = create_router(self.state.clone());

        if self.config.enable_cors {
            router = router.layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            );
        }

        if self.config.enable_request_logging {
            router = router.layer(TraceLayer::new_for_http());
        }

        router
    }

    /// Start the server
    pub async fn start(&self) -> Result<(), ServerError> {
        self.start_with_shutdown(std::future::pending::<()>()).await
    }

    /// Start with graceful shutdown
    pub async fn start_with_shutdown(
        &self,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Result<(), ServerError> {
        let router = self.build_router();
        let addr = self.config.bind_address();

        match self.config.tls_files() {
            Some((cert, key)) => {
                self.serve_tls(router, &addr, cert, key, shutdown_signal)
                    .await?
            }
            None => self.serve_plain(router, &addr, shutdown_signal).await?,
        }

        tracing::info!("Timer API server shutdown complete");
        Ok(())
    }

    async fn serve_plain(
        &self,
        router: Router,
        addr: &str,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Result<(), ServerError> {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(format!("{addr}: {e}")))?;

        tracing::info!(
            address = %addr,
            storage = self.state.controller.backend_name(),
            "Starting timer API server"
        );

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal)
            .await
            .map_err(|e| ServerError::ServeError(e.to_string()))
    }

    async fn serve_tls(
        &self,
        router: Router,
        addr: &str,
        certfile: &Path,
        keyfile: &Path,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Result<(), ServerError> {
        let tls = RustlsConfig::from_pem_file(certfile, keyfile)
            .await
            .map_err(|e| {
                ServerError::TlsError(format!(
                    "{} / {}: {e}",
                    certfile.display(),
                    keyfile.display()
                ))
            })?;

        let socket_addr = tokio::net::lookup_host(addr)
            .await
            .map_err(|e| ServerError::BindError(format!("{addr}: {e}")))?
            .next()
            .ok_or_else(|| ServerError::BindError(format!("{addr}: no address resolved")))?;

        let handle = axum_server::Handle::new();
        let shutdown = handle.clone();
        tokio::spawn(async move {
            shutdown_signal.await;
            shutdown.graceful_shutdown(Some(TLS_SHUTDOWN_GRACE));
        });

        tracing::info!(
            address = %socket_addr,
            storage = self.state.controller.backend_name(),
            certfile = %certfile.display(),
            "Starting timer API server with TLS"
        );

        axum_server::bind_rustls(socket_addr, tls)
            .handle(handle)
            .serve(router.into_make_service())
            .await
            .map_err(|e| ServerError::ServeError(e.to_string()))
    }

    /// Get server info
    pub fn info(&self) -> ServerInfo {
        ServerInfo {
            bind_address: self.config.bind_address(),
            storage_backend: self.state.controller.backend_name(),
            cors_enabled: self.config.enable_cors,
            request_logging_enabled: self.config.enable_request_logging,
            metrics_enabled: self.config.enable_metrics,
            tls_enabled: self.config.tls_files().is_some(),
        }
    }
}

/// Server information
#[derive(Debug, Clone)]
pub struct ServerInfo {
    pub bind_address: String,
    pub storage_backend: &'static str,
    pub cors_enabled: bool,
    pub request_logging_enabled: bool,
    pub metrics_enabled: bool,
    pub tls_enabled: bool,
}

impl ServerInfo {
    /// Format as display string
    pub fn display(&self) -> String {
        let flag = |on: bool| if on { "enabled" } else { "disabled" };
        format!(
            "Timer API Server\n\
             {:-<40}\n\
             Bind Address: {}\n\
             Storage: {}\n\
             CORS: {}\n\
             Request Logging: {}\n\
             Metrics: {}\n\
             TLS: {}",
            "",
            self.bind_address,
            self.storage_backend,
            flag(self.cors_enabled),
            flag(self.request_logging_enabled),
            flag(self.metrics_enabled),
            flag(self.tls_enabled)
        )
    }
}

// ============================================================================
// Server Errors
// ============================================================================

/// Server errors
#[derive(Debug, Clone)]
pub enum ServerError {
    /// Configuration error
    ConfigError(String),

    /// Failed to bind to address
    BindError(String),

    /// Certificate or key could not be loaded
    TlsError(String),

    /// Server error
    ServeError(String),
}

impl std::fmt::Display for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            Self::BindError(msg) => write!(f, "Failed to bind: {}", msg),
            Self::TlsError(msg) => write!(f, "TLS setup failed: {}", msg),
            Self::ServeError(msg) => write!(f, "Server error: {}", msg),
        }
    }
}

impl std::error::Error for ServerError {}

// ============================================================================
// Tests
// ============================================================================
