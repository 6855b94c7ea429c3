//! Storage layer for statlines
//!
//! SQLite-backed teams, matches, competitions and team season stats, with per-row
//! read-merge-write transactions and a migration ledger.

mod error;
mod migrations;
mod storage;
#[cfg(test)]
mod tests;

pub use error::StorageError;
pub use migrations::{
    ApplyFn, FailedMigration, MIGRATIONS, Migration, MigrationLedger, MigrationOutcome,
    MigrationRunReport, MigrationStatus, RunOneOutcome,
};
pub use storage::{MatchWrite, StatsWrite, Storage, TeamAliasRow, TeamPlan};
