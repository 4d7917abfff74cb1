//! In-process timer store
//!
//! Keeps timers in insertion order behind an `RwLock`. Used for `--memory`
//! runs and as a fast backend in tests.

use std::sync::RwLock;

use super::TimerStore;
use crate::error::{StoreError, StoreResult};
use crate::models::{Timer, TimerUpdate};

/// Memory implementation of [`TimerStore`]
#[derive(Debug, Default)]
pub struct MemoryTimerStore {
    timers: RwLock<Vec<Timer>>,
}

impl MemoryTimerStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `timers`
    pub fn with_timers(timers: impl IntoIterator<Item = Timer>) -> Self {
        Self {
            timers: RwLock::new(timers.into_iter().collect()),
        }
    }

    /// Number of stored timers
    pub fn len(&self) -> usize {
        self.timers.read().map(|t| t.len()).unwrap_or_default()
    }

    /// Whether the store holds no timers
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TimerStore for MemoryTimerStore {
    fn find_one(&self, id: &str) -> StoreResult<Option<Timer>> {
        let timers = self.timers.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(timers.iter().find(|t| t.id == id).cloned())
    }

    fn find_all(&self) -> StoreResult<Vec<Timer>> {
        let timers = self.timers.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(timers.clone())
    }

    fn insert_one(&self, timer: &Timer) -> StoreResult<()> {
        let mut timers = self.timers.write().map_err(|_| StoreError::LockPoisoned)?;
        if timers.iter().any(|t| t.id == timer.id) {
            return Err(StoreError::DuplicateKey(timer.id.clone()));
        }
        timers.push(timer.clone());
        Ok(())
    }

    fn find_one_and_update(&self, id: &str, update: &TimerUpdate) -> StoreResult<Option<Timer>> {
        let mut timers = self.timers.write().map_err(|_| StoreError::LockPoisoned)?;

        let Some(index) = timers.iter().position(|t| t.id == id) else {
            return Ok(None);
        };

        if update.id != id && timers.iter().any(|t| t.id == update.id) {
            return Err(StoreError::DuplicateKey(update.id.clone()));
        }

        let timer = &mut timers[index];
        timer.apply(update);
        Ok(Some(timer.clone()))
    }

    fn count_by_id(&self, id: &str) -> StoreResult<u64> {
        let timers = self.timers.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(timers.iter().filter(|t| t.id == id).count() as u64)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
