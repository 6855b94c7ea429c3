//! Typed error enum for the storage layer.
//!
//! Lets callers match on specific failure modes (not found, duplicate,
//! transient SQLite errors, rejected merges, failed migrations) instead of
//! downcasting opaque boxes.

use rusqlite::ErrorCode;
use statlines_core::CoreError;
use thiserror::Error;

/// Storage-layer error with variants covering every expected failure mode.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Row not found for expected-present entity.
    #[error("not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    /// Unique or primary-key constraint violation.
    #[error("duplicate: {0}")]
    Duplicate(String),

    /// SQL / busy / I/O failure. Nothing from the failed unit was committed.
    #[error("database error: {0}")]
    Database(#[source] rusqlite::Error),

    /// No connection could be checked out of the pool.
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// Row data could not be deserialized into domain type.
    #[error("data corruption: {context}")]
    DataCorruption {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The merge step refused to combine the stored and incoming match.
    #[error("merge rejected: {0}")]
    Merge(#[from] CoreError),

    /// Ledger misuse: bad registry order, out-of-order request.
    #[error("migration error: {0}")]
    Migration(String),

    /// A migration's own effect raised an error; its transaction was rolled back.
    #[error("migration {id} ({description}) failed: {source}")]
    MigrationFailed {
        id: u32,
        description: &'static str,
        #[source]
        source: rusqlite::Error,
    },
}

impl StorageError {
    /// Whether this error is likely transient (worth retrying).
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Pool(_) => true,
            Self::Database(rusqlite::Error::SqliteFailure(e, _)) => {
                matches!(e.code, ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked)
            },
            _ => false,
        }
    }

    /// Whether this error is a unique-constraint violation.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate(_))
    }
}

/// Custom `From<rusqlite::Error>` rather than a blanket `#[from]`.
///
/// - `QueryReturnedNoRows` → `NotFound` (generic; callers remap with entity context)
/// - `SQLITE_CONSTRAINT_UNIQUE` / `SQLITE_CONSTRAINT_PRIMARYKEY` → `Duplicate`
/// - Everything else → `Database`
impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::QueryReturnedNoRows => {
                Self::NotFound { entity: "row", id: "unknown".into() }
            },
            rusqlite::Error::SqliteFailure(e, msg)
                if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
            {
                Self::Duplicate(msg.clone().unwrap_or_else(|| e.to_string()))
            },
            _ => Self::Database(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sqlite_failure(code: std::os::raw::c_int) -> rusqlite::Error {
        rusqlite::Error::SqliteFailure(rusqlite::ffi::Error::new(code), None)
    }

    #[test]
    fn unique_violation_maps_to_duplicate() {
        let err = StorageError::from(sqlite_failure(rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE));
        assert!(err.is_duplicate());
        assert!(!err.is_transient());
    }

    #[test]
    fn busy_is_transient() {
        let err = StorageError::from(sqlite_failure(rusqlite::ffi::SQLITE_BUSY));
        assert!(err.is_transient());
        assert!(!err.is_duplicate());
    }

    #[test]
    fn no_rows_maps_to_not_found() {
        let err = StorageError::from(rusqlite::Error::QueryReturnedNoRows);
        assert!(matches!(err, StorageError::NotFound { .. }));
    }
}
