//! Test utilities and module declarations for storage tests.

use crate::Storage;
use chrono::NaiveDate;
use statlines_core::{MatchFields, MatchRecord, NaturalKey, TeamId};
use tempfile::TempDir;

#[expect(clippy::unwrap_used, reason = "test code")]
pub fn create_test_storage() -> (Storage, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let storage = Storage::new(&db_path).unwrap();
    (storage, temp_dir)
}

/// Storage over an empty file, no migrations applied.
#[expect(clippy::unwrap_used, reason = "test code")]
pub fn create_bare_storage() -> (Storage, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("bare.db");
    let storage = Storage::open(&db_path).unwrap();
    (storage, temp_dir)
}

#[expect(clippy::unwrap_used, reason = "test code")]
pub fn create_test_teams(storage: &Storage) -> (TeamId, TeamId) {
    let home = storage.insert_team("Arsenal", Some("ARS")).unwrap();
    let away = storage.insert_team("Chelsea", Some("CHE")).unwrap();
    (home, away)
}

#[expect(clippy::unwrap_used, reason = "test code")]
pub fn new_year_record(home: TeamId, away: TeamId, fields: MatchFields) -> MatchRecord {
    MatchRecord {
        key: NaturalKey {
            match_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            home_team_id: home,
            away_team_id: away,
        },
        fields,
    }
}

mod match_tests;
mod team_tests;
