//! SQLite-backed timer document store
//!
//! Each timer is kept as a JSON document in a single `timers` table keyed by
//! its id. The primary key doubles as the authoritative uniqueness guard.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};

use super::TimerStore;
use crate::error::{StoreError, StoreResult};
use crate::models::{Timer, TimerUpdate};

/// SQLite implementation of [`TimerStore`]
///
/// Uses `Mutex` to ensure thread-safety for the SQLite connection.
pub struct SqliteTimerStore {
    conn: Mutex<Connection>,
}

impl SqliteTimerStore {
    /// Open (or create) a store at `path`
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let conn = Connection::open(path).context("Failed to open SQLite database")?;

        // Enable WAL mode for better concurrency
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")
            .context("Failed to configure SQLite")?;

        let store = Self::from_connection(conn)?;

        tracing::info!(path = %path.display(), "SQLite timer store initialized");
        Ok(store)
    }

    /// Create in-memory store (for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to create in-memory SQLite")?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            r#"
                CREATE TABLE IF NOT EXISTS timers (
                    timerid TEXT PRIMARY KEY,
                    document TEXT NOT NULL,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );
                "#,
        )
        .context("Failed to create SQLite schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
    )
}

impl TimerStore for SqliteTimerStore {
    fn find_one(&self, id: &str) -> StoreResult<Option<Timer>> {
        let conn = self.lock()?;
        let document: Option<String> = conn
            .query_row(
                "SELECT document FROM timers WHERE timerid = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;

        document
            .map(|doc| serde_json::from_str(&doc))
            .transpose()
            .map_err(StoreError::from)
    }

    fn find_all(&self) -> StoreResult<Vec<Timer>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT document FROM timers ORDER BY rowid")?;
        let mut rows = stmt.query([])?;

        let mut timers = Vec::new();
        while let Some(row) = rows.next()? {
            let document: String = row.get(0)?;
            timers.push(serde_json::from_str(&document)?);
        }

        Ok(timers)
    }

    fn insert_one(&self, timer: &Timer) -> StoreResult<()> {
        let document = serde_json::to_string(timer)?;
        let now = Utc::now().to_rfc3339();

        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO timers (timerid, document, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?3)",
            params![timer.id, document, now],
        )
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::DuplicateKey(timer.id.clone())
            } else {
                StoreError::Database(e)
            }
        })?;

        Ok(())
    }

    fn find_one_and_update(&self, id: &str, update: &TimerUpdate) -> StoreResult<Option<Timer>> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let document: Option<String> = tx
            .query_row(
                "SELECT document FROM timers WHERE timerid = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;

        let Some(document) = document else {
            return Ok(None);
        };

        let mut timer: Timer = serde_json::from_str(&document)?;
        timer.apply(update);

        tx.execute(
            "UPDATE timers SET timerid = ?1, document = ?2, updated_at = ?3 WHERE timerid = ?4",
            params![timer.id, serde_json::to_string(&timer)?, Utc::now().to_rfc3339(), id],
        )
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::DuplicateKey(timer.id.clone())
            } else {
                StoreError::Database(e)
            }
        })?;
        tx.commit()?;

        Ok(Some(timer))
    }

    fn count_by_id(&self, id: &str) -> StoreResult<u64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM timers WHERE timerid = ?1",
            params![id],
            |row| row.get(0),
        )?;

        Ok(u64::try_from(count).unwrap_or_default())
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}
