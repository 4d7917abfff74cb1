//! Request validation for timer operations

use serde::de::Error as _;

use super::StorageExecutor;
use crate::error::{Result, TimerError};
use crate::models::Timer;

/// Decode a request body into a timer
///
/// The body must be a single JSON object whose fields have the expected
/// types. Anything else is [`TimerError::MalformedInput`].
pub fn validate_shape(body: &[u8]) -> Result<Timer> {
    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(TimerError::MalformedInput)?;

    if !value.is_object() {
        return Err(TimerError::MalformedInput(serde_json::Error::custom(
            "timer must be a JSON object",
        )));
    }

    serde_json::from_value(value).map_err(TimerError::MalformedInput)
}

/// Check required fields are present
pub fn validate_required(timer: &Timer) -> Result<()> {
    if timer.id.trim().is_empty() {
        return Err(TimerError::InvalidParameters(
            "timerid is required".to_string(),
        ));
    }

    Ok(())
}

/// Check the body's id matches the addressed timer
pub fn validate_key(path_id: &str, timer: &Timer) -> Result<()> {
    if timer.id != path_id {
        return Err(TimerError::InvalidParameters(format!(
            "timerid '{}' does not match the timer being replaced ('{}')",
            timer.id, path_id
        )));
    }

    Ok(())
}

/// Check no timer is stored under `id`
///
/// This is a fast-path rejection only. Two concurrent creates can both pass
/// it; the store's unique key decides between them.
pub async fn validate_unique(executor: &StorageExecutor, id: &str) -> Result<()> {
    let key = id.to_string();
    let count = executor
        .run("count_by_id", move |store| store.count_by_id(&key))
        .await
        .map_err(|e| super::storage_error("create", e))?;

    if count > 0 {
        return Err(TimerError::DuplicateIdentifier(id.to_string()));
    }

    Ok(())
}
