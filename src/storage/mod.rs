//! Storage gateway for timer documents
//!
//! This module defines the narrow interface the timer controller uses to
//! reach the persistent document store, plus the backends implementing it.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   TimerController                           │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    TimerStore trait                         │
//! │  find_one, find_all, insert_one, find_one_and_update, count │
//! └─────────────────────────────────────────────────────────────┘
//!                   │                         │
//!                   ▼                         ▼
//!         ┌─────────────────┐       ┌─────────────────┐
//!         │     SQLite      │       │     Memory      │
//!         │ SqliteTimerStore│       │MemoryTimerStore │
//!         └─────────────────┘       └─────────────────┘
//! ```
//!
//! Every method is blocking. Callers on the async runtime go through
//! [`crate::controller::StorageExecutor`], which moves each call onto a
//! blocking task.

use std::sync::Arc;

use anyhow::Result;

use crate::config::{StorageBackend, StorageConfig};
use crate::error::StoreResult;
use crate::models::{Timer, TimerUpdate};

pub mod memory;
pub mod sqlite;

pub use memory::MemoryTimerStore;
pub use sqlite::SqliteTimerStore;

/// Document store operations over timers, keyed by timer id
pub trait TimerStore: Send + Sync {
    /// Fetch the timer stored under `id`
    fn find_one(&self, id: &str) -> StoreResult<Option<Timer>>;

    /// Fetch every stored timer in insertion order
    ///
    /// The whole cursor is drained before returning, so callers receive
    /// either the complete set or an error.
    fn find_all(&self) -> StoreResult<Vec<Timer>>;

    /// Insert a new timer
    ///
    /// Returns [`crate::error::StoreError::DuplicateKey`] if `timer.id` is
    /// already present.
    fn insert_one(&self, timer: &Timer) -> StoreResult<()>;

    /// Apply `update` to the timer stored under `id`
    ///
    /// Returns the document as it reads after the update, or `None` when
    /// nothing matched.
    fn find_one_and_update(&self, id: &str, update: &TimerUpdate) -> StoreResult<Option<Timer>>;

    /// Count timers stored under `id`
    fn count_by_id(&self, id: &str) -> StoreResult<u64>;

    /// Short backend name for logs and health output
    fn backend_name(&self) -> &'static str;
}

/// Open the store described by `config`
///
/// Failure here is fatal to the process.
pub fn open_store(config: &StorageConfig) -> Result<Arc<dyn TimerStore>> {
    let store: Arc<dyn TimerStore> = match config.backend {
        StorageBackend::Sqlite => Arc::new(SqliteTimerStore::new(&config.sqlite_path)?),
        StorageBackend::Memory => Arc::new(MemoryTimerStore::new()),
    };

    tracing::info!(backend = store.backend_name(), "Timer store opened");
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_memory_store() {
        let config = StorageConfig {
            backend: StorageBackend::Memory,
            ..StorageConfig::default()
        };
        let store = open_store(&config).unwrap();
        assert_eq!(store.backend_name(), "memory");
    }

    #[test]
    fn test_open_sqlite_store() {
        let dir = TempDir::new().unwrap();
        let config = StorageConfig {
            backend: StorageBackend::Sqlite,
            sqlite_path: dir.path().join("nested/timers.db"),
            ..StorageConfig::default()
        };
        let store = open_store(&config).unwrap();
        assert_eq!(store.backend_name(), "sqlite");
        assert!(dir.path().join("nested/timers.db").exists());
    }
}
