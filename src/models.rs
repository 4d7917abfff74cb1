// Core data structures for the timer registry

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// A registered timer description
///
/// Field names on the wire are fixed: `timerid`, `expires`, `metaTags`,
/// `callbackReference` and `deleteAfter`. Missing fields decode to their
/// zero value and unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Timer {
    /// Externally supplied identifier, unique across all timers
    #[serde(rename = "timerid", default)]
    pub id: String,

    /// Expiry timestamp, stored verbatim
    #[serde(default)]
    pub expires: String,

    /// Opaque tags
    #[serde(rename = "metaTags", default, deserialize_with = "null_as_default")]
    pub metadata: BTreeMap<String, String>,

    /// Opaque callback endpoint or handle
    #[serde(rename = "callbackReference", default)]
    pub callback_reference: String,

    /// Deletion delay, immutable after creation
    #[serde(rename = "deleteAfter", default)]
    pub delete_after: i64,
}

impl Timer {
    /// Create a timer with the given id and zero values elsewhere
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Set the expiry timestamp
    pub fn with_expires(mut self, expires: impl Into<String>) -> Self {
        self.expires = expires.into();
        self
    }

    /// Add a metadata tag
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Set the callback reference
    pub fn with_callback(mut self, callback: impl Into<String>) -> Self {
        self.callback_reference = callback.into();
        self
    }

    /// Set the deletion delay
    pub fn with_delete_after(mut self, delete_after: i64) -> Self {
        self.delete_after = delete_after;
        self
    }

    /// Apply a replacement to this timer, leaving `delete_after` untouched
    pub fn apply(&mut self, update: &TimerUpdate) {
        self.id.clone_from(&update.id);
        self.expires.clone_from(&update.expires);
        self.metadata.clone_from(&update.metadata);
        self.callback_reference.clone_from(&update.callback_reference);
    }
}

/// Field set written by a replace
///
/// Carries every timer field except the immutable deletion delay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerUpdate {
    pub id: String,
    pub expires: String,
    pub metadata: BTreeMap<String, String>,
    pub callback_reference: String,
}

impl From<&Timer> for TimerUpdate {
    fn from(timer: &Timer) -> Self {
        Self {
            id: timer.id.clone(),
            expires: timer.expires.clone(),
            metadata: timer.metadata.clone(),
            callback_reference: timer.callback_reference.clone(),
        }
    }
}

// JSON `null` for a map decodes to an empty map
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
