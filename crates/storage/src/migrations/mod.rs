//! Statically registered schema migrations and the ledger that applies them.
//!
//! Every migration is a plain function run inside the same transaction as
//! the ledger row that records it.

#![allow(
    clippy::redundant_pub_crate,
    reason = "migrations module is private, pub(crate) is intentional"
)]

mod column_helpers;
mod ledger;
mod v1;
mod v2;
mod v3;
mod v4;
mod v5;
mod v6;
mod v7;
mod v8;
mod v9;
mod v10;
mod v11;
mod v12;

pub use ledger::{
    FailedMigration, MigrationLedger, MigrationOutcome, MigrationRunReport, MigrationStatus,
    RunOneOutcome,
};
use rusqlite::Connection;

/// Effect of one migration. Runs inside the transaction that also writes
/// the ledger row, so it must not commit or roll back on its own.
pub type ApplyFn = fn(&Connection) -> rusqlite::Result<()>;

/// One schema change: strictly increasing id, description, effect.
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    pub id: u32,
    pub description: &'static str,
    pub apply: ApplyFn,
}

/// The schema of this crate, in application order.
pub static MIGRATIONS: &[Migration] = &[
    Migration { id: 1, description: "teams and matches tables", apply: v1::apply },
    Migration { id: 2, description: "competitions table and match tagging", apply: v2::apply },
    Migration { id: 3, description: "competition on teams", apply: v3::apply },
    Migration { id: 4, description: "team alias table", apply: v4::apply },
    Migration { id: 5, description: "unique natural key on matches", apply: v5::apply },
    Migration { id: 6, description: "report reference and notes on matches", apply: v6::apply },
    Migration { id: 7, description: "team overall table results", apply: v7::apply },
    Migration { id: 8, description: "team home and away table results", apply: v8::apply },
    Migration { id: 9, description: "team squad standard stats", apply: v9::apply },
    Migration { id: 10, description: "team squad goalkeeping against", apply: v10::apply },
    Migration { id: 11, description: "team squad advanced goalkeeping", apply: v11::apply },
    Migration {
        id: 12,
        description: "drop penalties saved percentage from advanced goalkeeping",
        apply: v12::apply,
    },
];
