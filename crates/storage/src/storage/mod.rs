//! `SQLite` storage implementation
//!
//! All methods are synchronous. Each write is one transaction on one pooled
//! connection, so concurrent readers see either the old or the new row.

#![allow(
    clippy::as_conversions,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    reason = "SQLite i64 <-> Rust u32/usize conversions are bounded by row counts"
)]

mod competitions;
mod matches;
mod team_stats;
mod teams;

pub use matches::MatchWrite;
pub use team_stats::StatsWrite;
pub use teams::{TeamAliasRow, TeamPlan};

use std::path::Path;

use chrono::{DateTime, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use rusqlite::types::Type;
use statlines_core::{busy_timeout_ms_from_env, pool_size_from_env};

use crate::error::StorageError;
use crate::migrations::{MIGRATIONS, MigrationLedger};

/// Type alias for pooled connection
pub(crate) type PooledConn = PooledConnection<SqliteConnectionManager>;

/// Main storage struct wrapping `SQLite` connection pool
#[derive(Clone, Debug)]
pub struct Storage {
    pub(crate) pool: Pool<SqliteConnectionManager>,
}

/// Get a connection from the pool
pub(crate) fn get_conn(pool: &Pool<SqliteConnectionManager>) -> Result<PooledConn, StorageError> {
    Ok(pool.get()?)
}

/// Parse an RFC 3339 timestamp column.
pub(crate) fn parse_timestamp(idx: usize, s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Connection initializer for integrity and concurrency settings
fn init_connection(conn: &mut Connection, busy_timeout_ms: u32) -> Result<(), rusqlite::Error> {
    conn.execute_batch(&format!(
        "PRAGMA foreign_keys = ON;
         PRAGMA busy_timeout = {busy_timeout_ms};
         PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;"
    ))?;
    Ok(())
}

impl Storage {
    /// Open the database and apply every pending migration.
    ///
    /// # Errors
    /// Returns error if the pool cannot be built or a migration fails.
    pub fn new(db_path: &Path) -> Result<Self, StorageError> {
        let storage = Self::open(db_path)?;
        let report = storage.ledger()?.run_pending()?;
        if let Some(failed) = report.failed {
            return Err(StorageError::Migration(format!(
                "schema is behind: migration {} ({}) failed: {}",
                failed.id, failed.description, failed.error
            )));
        }
        Ok(storage)
    }

    /// Open the database without touching its schema.
    ///
    /// # Errors
    /// Returns error if the pool cannot be built.
    pub fn open(db_path: &Path) -> Result<Self, StorageError> {
        let busy_timeout_ms = busy_timeout_ms_from_env();
        let manager = SqliteConnectionManager::file(db_path)
            .with_init(move |conn| init_connection(conn, busy_timeout_ms));

        let pool_size = pool_size_from_env();
        let pool = Pool::builder().max_size(pool_size).build(manager)?;

        tracing::info!(
            pool_size = pool_size,
            path = %db_path.display(),
            "Storage initialized with connection pool"
        );

        Ok(Self { pool })
    }

    /// Ledger over the statically registered migrations.
    ///
    /// # Errors
    /// Returns error if the ledger table cannot be created.
    pub fn ledger(&self) -> Result<MigrationLedger<'static>, StorageError> {
        MigrationLedger::new(self, MIGRATIONS)
    }
}
