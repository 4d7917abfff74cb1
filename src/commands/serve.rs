use anyhow::{Context, Result};
use std::path::PathBuf;

use timerstore::config::{Config, StorageBackend};
use timerstore::controller::TimerController;
use timerstore::metrics;
use timerstore::service::TimerServer;
use timerstore::storage::open_store;

/// Command-line overrides for `serve`
#[derive(Debug, Default)]
pub struct ServeParams {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub db: Option<PathBuf>,
    pub memory: bool,
    pub storage_timeout: Option<u64>,
    pub no_metrics: bool,
    pub certfile: Option<PathBuf>,
    pub keyfile: Option<PathBuf>,
}

impl ServeParams {
    /// Apply overrides on top of file/env configuration
    pub fn apply(self, config: &mut Config) {
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(db) = self.db {
            config.storage.backend = StorageBackend::Sqlite;
            config.storage.sqlite_path = db;
        }
        if self.memory {
            config.storage.backend = StorageBackend::Memory;
        }
        if self.storage_timeout.is_some() {
            config.storage.timeout_secs = self.storage_timeout;
        }
        if self.no_metrics {
            config.server.enable_metrics = false;
        }
        if self.certfile.is_some() {
            config.server.certfile = self.certfile;
        }
        if self.keyfile.is_some() {
            config.server.keyfile = self.keyfile;
        }
    }
}

/// Run the timer API server until Ctrl-C
pub async fn serve(config: Config) -> Result<()> {
    config.validate()?;

    if config.server.enable_metrics {
        if let Err(e) = metrics::init_metrics() {
            tracing::warn!(error = %e, "Metrics disabled");
        }
    }

    let store = open_store(&config.storage).context("Failed to open timer store")?;
    let controller = TimerController::new(store, config.storage.timeout());
    let server = TimerServer::new(config.server, controller)?;

    println!("{}", server.info().display());
    println!();

    server.start_with_shutdown(shutdown_signal()).await?;
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}
