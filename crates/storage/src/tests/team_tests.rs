//! Team, alias and competition lookups.

#![allow(clippy::unwrap_used)]

use super::create_test_storage;
use statlines_core::TeamId;

#[test]
fn test_insert_and_get_team_by_name_ignores_case_and_spacing() {
    let (storage, _dir) = create_test_storage();

    let id = storage.insert_team("Manchester United", Some("MUN")).unwrap();

    let team = storage.get_team_by_name("  manchester   UNITED ").unwrap().unwrap();
    assert_eq!(team.id, id);
    assert_eq!(team.name, "Manchester United");
    assert_eq!(team.short_code.as_deref(), Some("MUN"));
    assert_eq!(storage.get_team(id).unwrap().unwrap().name, "Manchester United");
}

#[test]
fn test_insert_team_twice_is_duplicate() {
    let (storage, _dir) = create_test_storage();

    storage.insert_team("Arsenal", Some("ARS")).unwrap();
    let err = storage.insert_team("ARSENAL", None).unwrap_err();

    assert!(err.is_duplicate());
    assert_eq!(storage.list_teams().unwrap().len(), 1);
}

#[test]
fn test_get_missing_team_returns_none() {
    let (storage, _dir) = create_test_storage();

    assert!(storage.get_team(TeamId(42)).unwrap().is_none());
    assert!(storage.get_team_by_name("Nobody FC").unwrap().is_none());
}

#[test]
fn test_builtin_aliases_are_seeded() {
    let (storage, _dir) = create_test_storage();

    let spurs = storage.find_alias("spurs").unwrap().unwrap();
    assert_eq!(spurs.canonical_name, "Tottenham Hotspur");
    assert_eq!(spurs.short_code.as_deref(), Some("TOT"));
    assert!(storage.find_alias("not a club").unwrap().is_none());
}

#[test]
fn test_learned_alias_never_repoints() {
    let (storage, _dir) = create_test_storage();

    assert!(storage.learn_alias("Palace", "Crystal Palace").unwrap());
    assert!(!storage.learn_alias("palace", "Some Other Palace").unwrap());

    let alias = storage.find_alias("palace").unwrap().unwrap();
    assert_eq!(alias.canonical_name, "Crystal Palace");
    assert!(alias.short_code.is_none());
}

#[test]
fn test_short_code_lookup_is_case_insensitive() {
    let (storage, _dir) = create_test_storage();
    storage.insert_team("Arsenal", Some("ARS")).unwrap();
    storage.insert_team("Aston Villa", Some("AVL")).unwrap();

    assert_eq!(storage.team_names_by_short_code("ars").unwrap(), vec!["Arsenal".to_owned()]);
    assert!(storage.team_names_by_short_code("XYZ").unwrap().is_empty());
}

#[test]
fn test_set_short_code_only_reports_change() {
    let (storage, _dir) = create_test_storage();
    let id = storage.insert_team("Wolverhampton Wanderers", Some("WW")).unwrap();

    assert!(storage.set_team_short_code(id, "WOL").unwrap());
    assert!(!storage.set_team_short_code(id, "WOL").unwrap());
    assert_eq!(storage.get_team(id).unwrap().unwrap().short_code.as_deref(), Some("WOL"));
}

#[test]
fn test_competitions_seeded_and_team_tag_is_sticky() {
    let (storage, _dir) = create_test_storage();

    assert_eq!(storage.list_competitions().unwrap().len(), 5);
    let epl = storage.get_competition_by_short_name("epl").unwrap().unwrap();
    assert_eq!(epl.name, "Premier League");
    assert_eq!(epl.source_id, Some(9));
    let liga = storage.get_competition_by_short_name("LaLiga").unwrap().unwrap();

    let id = storage.insert_team("Brentford", Some("BRE")).unwrap();
    assert!(storage.tag_team_competition(id, epl.id).unwrap());
    assert!(!storage.tag_team_competition(id, liga.id).unwrap());
    assert_eq!(storage.get_team(id).unwrap().unwrap().competition_id, Some(epl.id));
}
