use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use statlines_core::{NaturalKey, StatTable};
use statlines_service::TeamRegistry;
use statlines_storage::Storage;

use crate::print_json;

pub(crate) fn run_resolve(db_path: &Path, name: &str) -> Result<()> {
    let storage = Storage::new(db_path)?;
    let id = TeamRegistry::new(storage.clone()).resolve(name)?;
    let team = storage.get_team(id)?.with_context(|| format!("team {id} vanished"))?;
    print_json(&team)
}

pub(crate) fn run_match(db_path: &Path, date: NaiveDate, home: &str, away: &str) -> Result<()> {
    let storage = Storage::new(db_path)?;
    let registry = TeamRegistry::new(storage.clone());
    let home_team_id = registry.lookup(home)?.with_context(|| format!("unknown team '{home}'"))?;
    let away_team_id = registry.lookup(away)?.with_context(|| format!("unknown team '{away}'"))?;

    let key = NaturalKey { match_date: date, home_team_id, away_team_id };
    let stored = storage.get_match_by_key(&key)?.with_context(|| format!("no match {key}"))?;
    print_json(&stored)
}

pub(crate) fn run_stats(db_path: &Path, team: &str, table: StatTable) -> Result<()> {
    let storage = Storage::new(db_path)?;
    let team_id = TeamRegistry::new(storage.clone())
        .lookup(team)?
        .with_context(|| format!("unknown team '{team}'"))?;
    print_json(&storage.list_team_stats(table, team_id)?)
}

pub(crate) fn run_teams(db_path: &Path) -> Result<()> {
    let storage = Storage::new(db_path)?;
    print_json(&storage.list_teams()?)
}
