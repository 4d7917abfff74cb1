//! Timer lifecycle controller
//!
//! Implements the three timer operations on top of a [`TimerStore`]:
//!
//! - **create** - decode, validate, check uniqueness, insert
//! - **list** - fetch every stored timer; an empty store is `NotFound`
//! - **replace** - fetch the existing entry, decode, guard the immutable
//!   `deleteAfter`, then update every other field
//!
//! Every storage call goes through [`StorageExecutor`], so each operation
//! waits on exactly one completion per call and never caches entries
//! between requests.
//!
//! # Replace state machine
//!
//! ```text
//! Received ─▶ Fetching ─┬─▶ NotFound
//!                       └─▶ Validating ─┬─▶ Rejected
//!                                       └─▶ Updating ─┬─▶ NotFound
//!                                                     └─▶ Updated
//! ```

use std::sync::Arc;
use std::time::Duration;

use crate::error::{Result, StoreError, TimerError};
use crate::models::{Timer, TimerUpdate};
use crate::storage::TimerStore;

pub mod executor;
pub mod validation;

pub use executor::StorageExecutor;

/// Creates, lists and replaces timers
#[derive(Clone)]
pub struct TimerController {
    executor: StorageExecutor,
}

impl TimerController {
    /// Create a controller over `store`
    pub fn new(store: Arc<dyn TimerStore>, storage_timeout: Option<Duration>) -> Self {
        Self {
            executor: StorageExecutor::new(store, storage_timeout),
        }
    }

    /// Name of the storage backend
    pub fn backend_name(&self) -> &'static str {
        self.executor.backend_name()
    }

    /// Create a timer from a raw request body
    pub async fn create(&self, body: &[u8]) -> Result<Timer> {
        let timer = validation::validate_shape(body)?;
        validation::validate_required(&timer)?;
        validation::validate_unique(&self.executor, &timer.id).await?;

        let timer = self
            .executor
            .run_write("insert_one", move |store| {
                store.insert_one(&timer).map(|()| timer)
            })
            .await
            .map_err(|e| storage_error("create", e))?;

        tracing::info!(timer_id = %timer.id, delete_after = timer.delete_after, "Timer created");
        Ok(timer)
    }

    /// List every stored timer
    pub async fn list(&self) -> Result<Vec<Timer>> {
        let timers = self
            .executor
            .run("find_all", |store| store.find_all())
            .await
            .map_err(|e| storage_error("list", e))?;

        if timers.is_empty() {
            return Err(TimerError::no_timers());
        }

        tracing::debug!(count = timers.len(), "Timers listed");
        Ok(timers)
    }

    /// Replace the timer stored under `id` with a raw request body
    pub async fn replace(&self, id: &str, body: &[u8]) -> Result<Timer> {
        let key = id.to_string();
        let existing = self
            .executor
            .run("find_one", move |store| store.find_one(&key))
            .await
            .map_err(|e| storage_error("replace", e))?
            .ok_or_else(|| TimerError::timer_not_found(id))?;

        let timer = validation::validate_shape(body)?;
        validation::validate_required(&timer)?;
        validation::validate_key(id, &timer)?;

        if timer.delete_after != existing.delete_after {
            tracing::warn!(
                timer_id = %id,
                stored = existing.delete_after,
                requested = timer.delete_after,
                "Rejected attempt to modify deleteAfter"
            );
            return Err(TimerError::Unauthorized);
        }

        let key = id.to_string();
        let update = TimerUpdate::from(&timer);
        let updated = self
            .executor
            .run_write("find_one_and_update", move |store| {
                store.find_one_and_update(&key, &update)
            })
            .await
            .map_err(|e| storage_error("replace", e))?
            .ok_or_else(|| TimerError::timer_not_found(id))?;

        tracing::info!(timer_id = %id, "Timer replaced");
        Ok(updated)
    }
}

fn storage_error(operation: &'static str, err: StoreError) -> TimerError {
    let err = TimerError::from(err);
    if let TimerError::StorageFailure(source) = &err {
        tracing::error!(operation, error = %source, "Timer storage failure");
    }
    err
}
