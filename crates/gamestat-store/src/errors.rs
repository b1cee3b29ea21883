//! Error types for the store.
//!
//! [`StoreError`] is returned by every store operation. Statement errors
//! bubble up to the transaction boundary, which decides whether they are
//! fatal ([`StoreError::Fatal`]) or logged and swallowed.

use gamestat_settings::DatabaseKind;
use rusqlite::ErrorCode;
use thiserror::Error;

use crate::database::DbState;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// `SQLite` database error.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection pool error.
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// A critical transaction failed; the database is not usable.
    #[error("critical transaction '{transaction}' failed: {source}")]
    Fatal {
        /// Name of the failed transaction (the patch name for migrations).
        transaction: String,
        /// What went wrong inside it.
        source: Box<StoreError>,
    },

    /// A patch ran but did not leave the schema in its applied shape.
    #[error("patch {patch} failed: {message}")]
    PatchFailed {
        /// Patch name.
        patch: &'static str,
        /// Describes what was still wrong.
        message: String,
    },

    /// Rows changed between an optimistic count and the write that relied on it.
    #[error("concurrent modification of {table}: expected {expected} rows, touched {actual}")]
    ConcurrentModification {
        /// Table being swept.
        table: &'static str,
        /// Rows counted before the write.
        expected: usize,
        /// Rows the write actually touched.
        actual: usize,
    },

    /// The database has not finished (or failed) startup.
    #[error("database is not ready (state: {0:?})")]
    NotReady(DbState),

    /// No connection implementation is available for this dialect.
    #[error("no connection support for {0} databases in this build")]
    UnsupportedDialect(DatabaseKind),

    /// A stored value could not be interpreted.
    #[error("invalid stored data: {0}")]
    InvalidData(String),
}

impl StoreError {
    /// Whether this error is a lost race with a concurrent writer.
    ///
    /// Only transactions that tolerate races, such as the cleanup sweep,
    /// treat this as a quiet skip.
    pub fn is_concurrent_modification(&self) -> bool {
        match self {
            Self::ConcurrentModification { .. } => true,
            Self::Sqlite(rusqlite::Error::SqliteFailure(err, _)) => matches!(
                err.code,
                ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked
            ),
            _ => false,
        }
    }
}

/// Convenience type alias for store results.
pub type Result<T> = std::result::Result<T, StoreError>;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
