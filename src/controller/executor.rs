//! Runs blocking storage calls from async request handlers
//!
//! Each call is moved onto its own blocking task and the caller awaits that
//! task's `JoinHandle`, which resolves exactly once with either the value or
//! an error.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{StoreError, StoreResult};
use crate::metrics;
use crate::storage::TimerStore;

/// Shared handle to the timer store plus the per-call read deadline
#[derive(Clone)]
pub struct StorageExecutor {
    store: Arc<dyn TimerStore>,
    timeout: Option<Duration>,
}

impl StorageExecutor {
    /// Create an executor over `store`
    ///
    /// With `timeout` set, a read that has not completed in time resolves to
    /// [`StoreError::Timeout`]. The blocking task cannot be interrupted, so
    /// writes never take a deadline: their result is only reported once the
    /// store has committed or failed.
    pub fn new(store: Arc<dyn TimerStore>, timeout: Option<Duration>) -> Self {
        Self { store, timeout }
    }

    /// Name of the underlying backend
    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    /// Run a read against the store, bounded by the configured deadline
    pub async fn run<T, F>(&self, operation: &'static str, f: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn TimerStore) -> StoreResult<T> + Send + 'static,
    {
        self.execute(operation, self.timeout, f).await
    }

    /// Run a mutation against the store and wait for it to finish
    pub async fn run_write<T, F>(&self, operation: &'static str, f: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn TimerStore) -> StoreResult<T> + Send + 'static,
    {
        self.execute(operation, None, f).await
    }

    async fn execute<T, F>(
        &self,
        operation: &'static str,
        deadline: Option<Duration>,
        f: F,
    ) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn TimerStore) -> StoreResult<T> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let started = Instant::now();
        let handle = tokio::task::spawn_blocking(move || f(store.as_ref()));

        let joined = match deadline {
            Some(limit) => match tokio::time::timeout(limit, handle).await {
                Ok(joined) => joined,
                Err(_) => Ok(Err(StoreError::Timeout(limit))),
            },
            None => handle.await,
        };

        let result = joined
            .map_err(|e| StoreError::Task(e.to_string()))
            .and_then(|inner| inner);

        metrics::record_storage_call(operation, result.is_ok(), started.elapsed().as_secs_f64());
        if let Err(e) = &result {
            tracing::debug!(operation, error = %e, "Storage call returned an error");
        }

        result
    }
}
