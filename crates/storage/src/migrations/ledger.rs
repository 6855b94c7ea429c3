//! Append-only record of applied migrations.
//!
//! A migration's effect and its ledger row are written in one immediate
//! transaction: either both are committed or neither is. A failed attempt is
//! recorded, with its error text, in a separate statement after the
//! rollback; a later success upgrades that same row in place and clears the
//! error rather than adding a second row.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};
use serde::Serialize;

use super::Migration;
use super::column_helpers::add_column_if_not_exists;
use crate::error::StorageError;
use crate::storage::{Storage, get_conn, parse_timestamp};

const LEDGER_SQL: &str = "
CREATE TABLE IF NOT EXISTS schema_migrations (
    id INTEGER PRIMARY KEY,
    description TEXT NOT NULL,
    applied_at TEXT NOT NULL,
    outcome TEXT NOT NULL CHECK (outcome IN ('succeeded', 'failed')),
    error TEXT
);
";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MigrationOutcome {
    Succeeded,
    Failed,
}

impl MigrationOutcome {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for MigrationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MigrationOutcome {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "succeeded" => Ok(Self::Succeeded),
            "failed" => Ok(Self::Failed),
            other => Err(StorageError::DataCorruption {
                context: format!("unknown migration outcome '{other}'"),
                source: format!("expected 'succeeded' or 'failed', got '{other}'").into(),
            }),
        }
    }
}

/// One line of [`MigrationLedger::status`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationStatus {
    pub id: u32,
    pub description: &'static str,
    pub applied: bool,
    pub applied_at: Option<DateTime<Utc>>,
    pub outcome: Option<MigrationOutcome>,
    /// Error of the last attempt, while that attempt is recorded as failed.
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedMigration {
    pub id: u32,
    pub description: &'static str,
    pub error: String,
}

/// Result of [`MigrationLedger::run_pending`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationRunReport {
    /// Applied by this run, in order.
    pub applied: Vec<u32>,
    /// Already recorded as succeeded before this run.
    pub already_applied: Vec<u32>,
    pub failed: Option<FailedMigration>,
    /// Pending migrations after the failed one; left untouched.
    pub not_attempted: Vec<u32>,
}

impl MigrationRunReport {
    #[must_use]
    pub const fn halted(&self) -> bool {
        self.failed.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOneOutcome {
    Applied,
    AlreadyApplied,
}

struct LedgerRow {
    applied_at: DateTime<Utc>,
    outcome: MigrationOutcome,
    error: Option<String>,
}

/// Applies a fixed, ordered migration list against one database.
#[derive(Debug, Clone)]
pub struct MigrationLedger<'a> {
    pool: Pool<SqliteConnectionManager>,
    migrations: &'a [Migration],
}

impl<'a> MigrationLedger<'a> {
    /// Validate the registry and make sure the ledger table exists.
    ///
    /// # Errors
    /// Returns `Migration` if ids are zero or not strictly ascending, or a
    /// database error if the ledger table cannot be created.
    pub fn new(storage: &Storage, migrations: &'a [Migration]) -> Result<Self, StorageError> {
        let mut previous = 0u32;
        for m in migrations {
            if m.id <= previous {
                return Err(StorageError::Migration(format!(
                    "migration ids must be positive and strictly ascending: {} follows {}",
                    m.id, previous
                )));
            }
            previous = m.id;
        }

        let conn = get_conn(&storage.pool)?;
        conn.execute_batch(LEDGER_SQL)?;
        // Ledger tables created before the error column existed.
        add_column_if_not_exists(&conn, "schema_migrations", "error", "TEXT")?;

        Ok(Self { pool: storage.pool.clone(), migrations })
    }

    #[must_use]
    pub const fn migrations(&self) -> &'a [Migration] {
        self.migrations
    }

    /// Every registered migration with its ledger state, in id order.
    ///
    /// # Errors
    /// Returns error if the ledger cannot be read.
    pub fn status(&self) -> Result<Vec<MigrationStatus>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let mut recorded = load_ledger(&conn)?;
        Ok(self
            .migrations
            .iter()
            .map(|m| {
                let row = recorded.remove(&m.id);
                MigrationStatus {
                    id: m.id,
                    description: m.description,
                    applied: row.as_ref().is_some_and(|r| r.outcome == MigrationOutcome::Succeeded),
                    applied_at: row.as_ref().map(|r| r.applied_at),
                    outcome: row.as_ref().map(|r| r.outcome),
                    error: row.and_then(|r| r.error),
                }
            })
            .collect())
    }

    /// Apply every migration not yet recorded as succeeded, in ascending order.
    ///
    /// Halts at the first migration whose effect fails; it is recorded as
    /// failed and the remaining pending ids are reported as not attempted.
    ///
    /// # Errors
    /// Returns error if the database itself is unavailable. A failing
    /// migration effect is reported in [`MigrationRunReport::failed`] instead.
    pub fn run_pending(&self) -> Result<MigrationRunReport, StorageError> {
        let recorded = {
            let conn = get_conn(&self.pool)?;
            load_ledger(&conn)?
        };
        let mut report = MigrationRunReport::default();

        for (idx, m) in self.migrations.iter().enumerate() {
            if recorded.get(&m.id).is_some_and(|r| r.outcome == MigrationOutcome::Succeeded) {
                report.already_applied.push(m.id);
                continue;
            }
            match self.apply(m) {
                Ok(RunOneOutcome::Applied) => report.applied.push(m.id),
                Ok(RunOneOutcome::AlreadyApplied) => report.already_applied.push(m.id),
                Err(StorageError::MigrationFailed { source, .. }) => {
                    report.failed = Some(FailedMigration {
                        id: m.id,
                        description: m.description,
                        error: source.to_string(),
                    });
                    report.not_attempted = self.migrations[idx + 1..]
                        .iter()
                        .filter(|later| {
                            !recorded
                                .get(&later.id)
                                .is_some_and(|r| r.outcome == MigrationOutcome::Succeeded)
                        })
                        .map(|later| later.id)
                        .collect();
                    tracing::warn!(
                        id = m.id,
                        not_attempted = ?report.not_attempted,
                        "Migration run halted"
                    );
                    break;
                },
                Err(e) => return Err(e),
            }
        }

        tracing::info!(
            applied = report.applied.len(),
            already_applied = report.already_applied.len(),
            halted = report.halted(),
            "Migration run finished"
        );
        Ok(report)
    }

    /// Apply one migration by id. Re-running an applied id is a no-op.
    ///
    /// # Errors
    /// Returns `NotFound` for an unregistered id, `Migration` if a lower id is
    /// still unapplied, or `MigrationFailed` if the effect fails.
    pub fn run_one(&self, id: u32) -> Result<RunOneOutcome, StorageError> {
        let m = self
            .migrations
            .iter()
            .find(|m| m.id == id)
            .ok_or_else(|| StorageError::NotFound { entity: "migration", id: id.to_string() })?;

        let recorded = {
            let conn = get_conn(&self.pool)?;
            load_ledger(&conn)?
        };
        let missing: Vec<u32> = self
            .migrations
            .iter()
            .take_while(|earlier| earlier.id < id)
            .filter(|earlier| {
                !recorded.get(&earlier.id).is_some_and(|r| r.outcome == MigrationOutcome::Succeeded)
            })
            .map(|earlier| earlier.id)
            .collect();
        if !missing.is_empty() {
            return Err(StorageError::Migration(format!(
                "migration {id} requires {missing:?} to be applied first"
            )));
        }

        self.apply(m)
    }

    fn apply(&self, m: &Migration) -> Result<RunOneOutcome, StorageError> {
        let mut conn = get_conn(&self.pool)?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        if outcome_of(&tx, m.id)? == Some(MigrationOutcome::Succeeded) {
            tracing::debug!(id = m.id, "Migration already applied");
            return Ok(RunOneOutcome::AlreadyApplied);
        }

        tracing::info!(id = m.id, description = m.description, "Applying migration");
        if let Err(source) = (m.apply)(&tx) {
            tx.rollback()?;
            record(&conn, m, MigrationOutcome::Failed, Some(&source.to_string()))?;
            tracing::error!(id = m.id, description = m.description, error = %source, "Migration failed");
            return Err(StorageError::MigrationFailed { id: m.id, description: m.description, source });
        }

        record(&tx, m, MigrationOutcome::Succeeded, None)?;
        tx.commit()?;
        Ok(RunOneOutcome::Applied)
    }
}

fn outcome_of(conn: &Connection, id: u32) -> Result<Option<MigrationOutcome>, StorageError> {
    let raw: Option<String> = conn
        .query_row("SELECT outcome FROM schema_migrations WHERE id = ?1", params![id], |row| {
            row.get(0)
        })
        .optional()?;
    raw.map(|s| s.parse()).transpose()
}

/// Write the ledger row for `m`. An existing row for the id (only ever a
/// failed attempt) is updated, never duplicated.
fn record(
    conn: &Connection,
    m: &Migration,
    outcome: MigrationOutcome,
    error: Option<&str>,
) -> Result<(), StorageError> {
    let now = Utc::now().to_rfc3339();
    if outcome_of(conn, m.id)?.is_some() {
        conn.execute(
            "UPDATE schema_migrations SET description = ?2, applied_at = ?3, outcome = ?4, error = ?5
             WHERE id = ?1",
            params![m.id, m.description, now, outcome.as_str(), error],
        )?;
    } else {
        conn.execute(
            "INSERT INTO schema_migrations (id, description, applied_at, outcome, error)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![m.id, m.description, now, outcome.as_str(), error],
        )?;
    }
    Ok(())
}

fn load_ledger(conn: &Connection) -> Result<HashMap<u32, LedgerRow>, StorageError> {
    let mut stmt = conn.prepare("SELECT id, applied_at, outcome, error FROM schema_migrations")?;
    let rows = stmt.query_map([], |row| {
        let outcome: String = row.get(2)?;
        let outcome = outcome
            .parse::<MigrationOutcome>()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?;
        Ok((
            row.get::<_, u32>(0)?,
            LedgerRow {
                applied_at: parse_timestamp(1, &row.get::<_, String>(1)?)?,
                outcome,
                error: row.get(3)?,
            },
        ))
    })?;
    Ok(rows.collect::<Result<HashMap<_, _>, _>>()?)
}
