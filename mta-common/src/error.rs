//! Errors raised by the trick store and its configuration layer
//!
//! The store reports two kinds of transient database failure that callers
//! act on: lock contention between concurrent writers, which is retried with
//! backoff, and foreign-key violations from edges that name tricks deleted
//! since the corpus was read, which trigger a fresh recompute.

use std::fmt::Display;
use thiserror::Error;

/// Result type for trick store operations
pub type Result<T> = std::result::Result<T, Error>;

/// SQLite primary result codes (extended codes keep these in the low byte)
const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

#[derive(Error, Debug)]
pub enum Error {
    /// Query, transaction or connection failure; the transaction was rolled back
    #[error("Trick store error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Trick props that do not serialize
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Unreadable config file or out-of-range setting
    #[error("Configuration error: {0}")]
    Config(String),

    /// A book, trick or effect type missing from the store
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// Stored column value that does not decode (UUID, timestamp, props, enum label)
    #[error("Corrupt stored value: {0}")]
    CorruptValue(String),

    /// Writer gave up waiting for the database lock
    #[error("{operation}: database still locked after {attempts} attempts ({elapsed_ms} ms)")]
    LockTimeout {
        operation: String,
        attempts: u32,
        elapsed_ms: u64,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn not_found(kind: &'static str, id: impl Display) -> Self {
        Error::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// Whether SQLite reported the database busy or locked
    pub fn is_lock_contention(&self) -> bool {
        match self {
            Error::Database(sqlx::Error::Database(db_err)) => {
                let primary = db_err
                    .code()
                    .and_then(|code| code.parse::<i32>().ok())
                    .map(|code| code & 0xff);
                matches!(primary, Some(SQLITE_BUSY) | Some(SQLITE_LOCKED))
                    || db_err.message().contains("database is locked")
            }
            Error::Database(other) => other.to_string().contains("database is locked"),
            _ => false,
        }
    }

    /// Whether a write referenced a row that no longer exists
    pub fn is_foreign_key_violation(&self) -> bool {
        match self {
            Error::Database(sqlx::Error::Database(db_err)) => {
                db_err.is_foreign_key_violation()
                    || db_err.message().contains("FOREIGN KEY constraint failed")
            }
            _ => false,
        }
    }
}
