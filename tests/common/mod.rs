//! Common test utilities

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use timerstore::controller::TimerController;
use timerstore::error::{StoreError, StoreResult};
use timerstore::service::{ServerConfig, TimerServer};
use timerstore::storage::{MemoryTimerStore, TimerStore};
use timerstore::{Timer, TimerUpdate};

/// Timer used by the HTTP scenarios
pub fn sample_timer(id: &str) -> Timer {
    Timer::new(id)
        .with_expires("2023-06-26T13:40:17Z")
        .with_tag("a", "b")
        .with_callback("cb")
        .with_delete_after(0)
}

/// Wire body for `sample_timer`
pub fn sample_body(id: &str) -> Value {
    serde_json::to_value(sample_timer(id)).unwrap()
}

/// Router over an arbitrary store
pub fn app_with_store(store: Arc<dyn TimerStore>) -> Router {
    let controller = TimerController::new(store, None);
    TimerServer::new(ServerConfig::default(), controller)
        .unwrap()
        .build_router()
}

/// Router whose storage calls share a deadline
pub fn app_with_timeout(store: Arc<dyn TimerStore>, timeout: Duration) -> Router {
    let controller = TimerController::new(store, Some(timeout));
    TimerServer::new(ServerConfig::default(), controller)
        .unwrap()
        .build_router()
}

/// Router over a fresh memory store
pub fn memory_app() -> (Router, Arc<MemoryTimerStore>) {
    let store = Arc::new(MemoryTimerStore::new());
    (app_with_store(store.clone()), store)
}

/// Send a request with an optional JSON body
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let body = match body {
        Some(value) => Body::from(serde_json::to_vec(&value).unwrap()),
        None => Body::empty(),
    };
    send_raw(app, method, uri, body).await
}

/// Send a request with a raw body
pub async fn send_raw(app: &Router, method: Method, uri: &str, body: Body) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body)
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };

    (status, json)
}

/// Store that fails its first `failures` calls, then delegates to memory
pub struct FlakyStore {
    inner: MemoryTimerStore,
    failures: AtomicUsize,
}

impl FlakyStore {
    pub fn new(failures: usize) -> Self {
        Self {
            inner: MemoryTimerStore::new(),
            failures: AtomicUsize::new(failures),
        }
    }

    /// Store that never succeeds
    pub fn broken() -> Self {
        Self::new(usize::MAX)
    }

    pub fn inner(&self) -> &MemoryTimerStore {
        &self.inner
    }

    fn check(&self) -> StoreResult<()> {
        let tripped = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if tripped {
            Err(StoreError::Task("connection reset by peer".to_string()))
        } else {
            Ok(())
        }
    }
}

impl TimerStore for FlakyStore {
    fn find_one(&self, id: &str) -> StoreResult<Option<Timer>> {
        self.check()?;
        self.inner.find_one(id)
    }

    fn find_all(&self) -> StoreResult<Vec<Timer>> {
        self.check()?;
        self.inner.find_all()
    }

    fn insert_one(&self, timer: &Timer) -> StoreResult<()> {
        self.check()?;
        self.inner.insert_one(timer)
    }

    fn find_one_and_update(&self, id: &str, update: &TimerUpdate) -> StoreResult<Option<Timer>> {
        self.check()?;
        self.inner.find_one_and_update(id, update)
    }

    fn count_by_id(&self, id: &str) -> StoreResult<u64> {
        self.check()?;
        self.inner.count_by_id(id)
    }

    fn backend_name(&self) -> &'static str {
        "flaky"
    }
}

/// Store whose calls block before delegating to memory
pub struct SlowStore {
    inner: MemoryTimerStore,
    read_delay: Duration,
    write_delay: Duration,
}

impl SlowStore {
    /// Every call blocks for `delay`
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: MemoryTimerStore::new(),
            read_delay: delay,
            write_delay: delay,
        }
    }

    /// Only inserts and updates block for `delay`
    pub fn slow_writes(delay: Duration) -> Self {
        Self {
            inner: MemoryTimerStore::new(),
            read_delay: Duration::ZERO,
            write_delay: delay,
        }
    }

    pub fn inner(&self) -> &MemoryTimerStore {
        &self.inner
    }
}

impl TimerStore for SlowStore {
    fn find_one(&self, id: &str) -> StoreResult<Option<Timer>> {
        std::thread::sleep(self.read_delay);
        self.inner.find_one(id)
    }

    fn find_all(&self) -> StoreResult<Vec<Timer>> {
        std::thread::sleep(self.read_delay);
        self.inner.find_all()
    }

    fn insert_one(&self, timer: &Timer) -> StoreResult<()> {
        std::thread::sleep(self.write_delay);
        self.inner.insert_one(timer)
    }

    fn find_one_and_update(&self, id: &str, update: &TimerUpdate) -> StoreResult<Option<Timer>> {
        std::thread::sleep(self.write_delay);
        self.inner.find_one_and_update(id, update)
    }

    fn count_by_id(&self, id: &str) -> StoreResult<u64> {
        std::thread::sleep(self.read_delay);
        self.inner.count_by_id(id)
    }

    fn backend_name(&self) -> &'static str {
        "slow"
    }
}

/// How `UpdateFailingStore` answers an update
#[derive(Debug, Clone, Copy)]
pub enum UpdateOutcome {
    /// The entry disappears between the fetch and the update
    Vanished,
    /// The update call itself fails
    Fails,
}

/// Store whose reads succeed but whose updates never land
pub struct UpdateFailingStore {
    inner: MemoryTimerStore,
    outcome: UpdateOutcome,
}

impl UpdateFailingStore {
    pub fn new(outcome: UpdateOutcome, timers: impl IntoIterator<Item = Timer>) -> Self {
        Self {
            inner: MemoryTimerStore::with_timers(timers),
            outcome,
        }
    }

    pub fn inner(&self) -> &MemoryTimerStore {
        &self.inner
    }
}

impl TimerStore for UpdateFailingStore {
    fn find_one(&self, id: &str) -> StoreResult<Option<Timer>> {
        self.inner.find_one(id)
    }

    fn find_all(&self) -> StoreResult<Vec<Timer>> {
        self.inner.find_all()
    }

    fn insert_one(&self, timer: &Timer) -> StoreResult<()> {
        self.inner.insert_one(timer)
    }

    fn find_one_and_update(&self, _id: &str, _update: &TimerUpdate) -> StoreResult<Option<Timer>> {
        match self.outcome {
            UpdateOutcome::Vanished => Ok(None),
            UpdateOutcome::Fails => Err(StoreError::Task("write rejected".to_string())),
        }
    }

    fn count_by_id(&self, id: &str) -> StoreResult<u64> {
        self.inner.count_by_id(id)
    }

    fn backend_name(&self) -> &'static str {
        "update-failing"
    }
}
