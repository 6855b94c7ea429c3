//! Schema migration commands.
//!
//! These open the database without migrating it, so `status` shows the
//! schema as it is on disk.

use std::path::Path;

use anyhow::Result;
use statlines_storage::Storage;

use crate::print_json;

pub(crate) fn run_status(db_path: &Path) -> Result<()> {
    let storage = Storage::open(db_path)?;
    let status = storage.ledger()?.status()?;
    print_json(&status)
}

pub(crate) fn run_pending(db_path: &Path) -> Result<()> {
    let storage = Storage::open(db_path)?;
    let report = storage.ledger()?.run_pending()?;
    print_json(&report)?;
    if let Some(failed) = &report.failed {
        anyhow::bail!(
            "migration {} ({}) failed, {} not attempted: {}",
            failed.id,
            failed.description,
            report.not_attempted.len(),
            failed.error
        );
    }
    Ok(())
}

pub(crate) fn run_one(db_path: &Path, id: u32) -> Result<()> {
    let storage = Storage::open(db_path)?;
    let outcome = storage.ledger()?.run_one(id)?;
    print_json(&serde_json::json!({ "id": id, "outcome": outcome }))
}
