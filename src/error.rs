//! Error handling for the timerstore crate
//!
//! Two layers of errors are defined here:
//!
//! - [`StoreError`] - failures raised by a storage backend or by the
//!   machinery that runs storage calls
//! - [`TimerError`] - the outcome taxonomy of a timer operation, each
//!   variant mapping to exactly one HTTP status
//!
//! # Usage
//!
//! ```rust,ignore
//! use timerstore::error::TimerError;
//!
//! fn describe(err: &TimerError) {
//!     println!("{} -> {}", err.code(), err.status_code());
//! }
//! ```

use std::time::Duration;

use axum::http::StatusCode;
use thiserror::Error;

/// Errors raised by a storage backend
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Stored document could not be encoded or decoded
    #[error("Document error: {0}")]
    Document(#[from] serde_json::Error),

    /// Unique key constraint violated
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    /// A thread panicked while holding the store lock
    #[error("Storage lock poisoned")]
    LockPoisoned,

    /// Storage call exceeded its deadline
    #[error("Storage operation timed out after {0:?}")]
    Timeout(Duration),

    /// Blocking task failed to complete
    #[error("Storage task failed: {0}")]
    Task(String),
}

/// Result type alias for storage operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Outcome of a failed timer operation
#[derive(Error, Debug)]
pub enum TimerError {
    /// Request body cannot be decoded into a timer
    #[error("Failed to parse request body! Please verify json inputs type!")]
    MalformedInput(#[source] serde_json::Error),

    /// Body decoded but failed required-field checks
    #[error("Invalid request parameters: {0}")]
    InvalidParameters(String),

    /// Timer identifier already in use
    #[error("The timer ID must be unique! '{0}' already exists")]
    DuplicateIdentifier(String),

    /// Replace tried to change the immutable deletion delay
    #[error("Unauthorized: Modifying deleteAfter field of the last entry is not allowed. Please retry without it!")]
    Unauthorized,

    /// No matching entry
    #[error("{0}")]
    NotFound(String),

    /// Underlying store call failed
    #[error("Failed to access timer storage")]
    StorageFailure(#[source] StoreError),
}

impl TimerError {
    /// Not-found error for a specific timer
    pub fn timer_not_found(id: &str) -> Self {
        Self::NotFound(format!(
            "Timer '{id}' not found. Please verify the timer ID or create a new one!"
        ))
    }

    /// Not-found error for an empty listing
    pub fn no_timers() -> Self {
        Self::NotFound("No timers found".to_string())
    }

    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MalformedInput(_) | Self::InvalidParameters(_) | Self::DuplicateIdentifier(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::StorageFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Self::MalformedInput(_) => "malformed_input",
            Self::InvalidParameters(_) => "invalid_parameters",
            Self::DuplicateIdentifier(_) => "duplicate_identifier",
            Self::Unauthorized => "unauthorized",
            Self::NotFound(_) => "not_found",
            Self::StorageFailure(_) => "storage_failure",
        }
    }
}

impl From<StoreError> for TimerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateKey(id) => Self::DuplicateIdentifier(id),
            other => Self::StorageFailure(other),
        }
    }
}

/// Result type alias for timer operations
pub type Result<T> = std::result::Result<T, TimerError>;
