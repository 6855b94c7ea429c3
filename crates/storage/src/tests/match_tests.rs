//! Read-merge-write of matches under the natural key.

#![allow(clippy::unwrap_used)]

use super::{create_test_storage, create_test_teams, new_year_record};
use chrono::NaiveDate;
use rusqlite::params;
use statlines_core::{CoreError, ExpectedGoals, MatchFields, MatchId, MergeKind, NaturalKey};

use crate::StorageError;
use crate::storage::get_conn;

fn fixture_fields() -> MatchFields {
    MatchFields { venue: Some("Emirates Stadium".to_owned()), ..MatchFields::default() }
}

#[test]
fn test_apply_match_creates_then_fills_scores() {
    let (storage, _dir) = create_test_storage();
    let (home, away) = create_test_teams(&storage);

    let first = storage.apply_match(&new_year_record(home, away, fixture_fields())).unwrap();
    assert_eq!(first.kind, MergeKind::Created);

    let result = MatchFields {
        home_score: Some(2),
        away_score: Some(1),
        home_xg: Some(ExpectedGoals::from_hundredths(185)),
        ..MatchFields::default()
    };
    let second = storage.apply_match(&new_year_record(home, away, result)).unwrap();
    assert_eq!(second.kind, MergeKind::Updated);
    assert_eq!(second.id, first.id);
    assert!(second.corrections.is_empty());

    let stored = storage.get_match(first.id).unwrap().unwrap();
    assert_eq!(stored.fields.home_score, Some(2));
    assert_eq!(stored.fields.away_score, Some(1));
    assert_eq!(stored.fields.home_xg, Some(ExpectedGoals::from_hundredths(185)));
    assert_eq!(stored.fields.venue.as_deref(), Some("Emirates Stadium"));
    assert_eq!(storage.count_matches().unwrap(), 1);
}

#[test]
fn test_reapplying_same_record_is_unchanged_but_refreshes_timestamp() {
    let (storage, _dir) = create_test_storage();
    let (home, away) = create_test_teams(&storage);
    let record = new_year_record(home, away, fixture_fields());

    let first = storage.apply_match(&record).unwrap();
    let before = storage.get_match(first.id).unwrap().unwrap();
    let again = storage.apply_match(&record).unwrap();
    let after = storage.get_match(first.id).unwrap().unwrap();

    assert_eq!(again.kind, MergeKind::Unchanged);
    assert_eq!(after.fields, before.fields);
    assert_eq!(after.first_seen_at, before.first_seen_at);
    assert!(after.updated_at >= before.updated_at);
    assert_eq!(storage.count_matches().unwrap(), 1);
}

#[test]
fn test_correction_is_reported_and_applied() {
    let (storage, _dir) = create_test_storage();
    let (home, away) = create_test_teams(&storage);

    let crowd = |n| MatchFields { attendance: Some(n), ..MatchFields::default() };
    storage.apply_match(&new_year_record(home, away, crowd(60_100))).unwrap();
    let write = storage.apply_match(&new_year_record(home, away, crowd(60_261))).unwrap();

    assert_eq!(write.kind, MergeKind::Updated);
    assert_eq!(write.corrections.len(), 1);
    assert_eq!(write.corrections[0].field, "attendance");
    assert_eq!(write.corrections[0].previous, "60100");
    assert_eq!(write.corrections[0].current, "60261");
    assert_eq!(storage.get_match(write.id).unwrap().unwrap().fields.attendance, Some(60_261));
}

#[test]
fn test_get_match_by_key_distinguishes_home_and_away() {
    let (storage, _dir) = create_test_storage();
    let (home, away) = create_test_teams(&storage);
    let write = storage.apply_match(&new_year_record(home, away, fixture_fields())).unwrap();

    let key = NaturalKey {
        match_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        home_team_id: home,
        away_team_id: away,
    };
    assert_eq!(storage.get_match_by_key(&key).unwrap().unwrap().id, write.id);

    let reversed = NaturalKey { home_team_id: away, away_team_id: home, ..key };
    assert!(storage.get_match_by_key(&reversed).unwrap().is_none());
    assert!(storage.get_match(MatchId(9999)).unwrap().is_none());
}

#[test]
fn test_natural_key_is_unique_in_storage() {
    let (storage, _dir) = create_test_storage();
    let (home, away) = create_test_teams(&storage);
    storage.apply_match(&new_year_record(home, away, fixture_fields())).unwrap();

    let conn = get_conn(&storage.pool).unwrap();
    let err = conn
        .execute(
            "INSERT INTO matches (match_date, home_team_id, away_team_id, first_seen_at, updated_at)
             VALUES ('2025-01-01', ?1, ?2, 'x', 'x')",
            params![home.0, away.0],
        )
        .unwrap_err();
    assert!(StorageError::from(err).is_duplicate());
}

#[test]
fn test_unknown_team_rolls_back_write() {
    let (storage, _dir) = create_test_storage();
    let (home, _) = create_test_teams(&storage);

    let err = storage
        .apply_match(&new_year_record(home, statlines_core::TeamId(777), fixture_fields()))
        .unwrap_err();

    assert!(matches!(err, StorageError::Database(_)));
    assert_eq!(storage.count_matches().unwrap(), 0);
}

#[test]
fn test_merge_error_converts_from_core() {
    let err = StorageError::from(CoreError::InvalidInput("bad".to_owned()));
    assert!(matches!(err, StorageError::Merge(_)));
    assert!(!err.is_transient());
}
