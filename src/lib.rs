//! timerstore - Timer resource registry
//!
//! A registry of timer descriptions (id, expiry, tags, callback reference and
//! an immutable deletion delay) served over a REST API and persisted in a
//! document store.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`models`] - The `Timer` entity and its update set
//! - [`storage`] - Storage gateway trait and backends (SQLite, memory)
//! - [`controller`] - Timer lifecycle operations and validation
//! - [`service`] - axum router, handlers and server
//! - [`metrics`] - Prometheus metrics
//! - [`error`] - Error taxonomy and status mapping
//!
//! # Example
//!
//! ```no_run
//! use timerstore::config::Config;
//! use timerstore::controller::TimerController;
//! use timerstore::service::TimerServer;
//! use timerstore::storage::open_store;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let store = open_store(&config.storage)?;
//!     let controller = TimerController::new(store, config.storage.timeout());
//!     let server = TimerServer::new(config.server, controller)?;
//!     server.start().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod metrics;
pub mod models;
pub mod service;
pub mod storage;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::controller::TimerController;
    pub use crate::error::{Result, StoreError, TimerError};
    pub use crate::models::{Timer, TimerUpdate};
    pub use crate::service::{ServerConfig, TimerServer};
    pub use crate::storage::{MemoryTimerStore, SqliteTimerStore, TimerStore};
}

// Direct re-exports for convenience
pub use models::{Timer, TimerUpdate};
