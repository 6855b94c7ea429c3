//! Team name resolution against a real database.

#![allow(clippy::unwrap_used)]

use std::thread;

use statlines_storage::TeamPlan;

use super::create_test_db;
use crate::{ServiceError, TeamRegistry};

#[test]
fn test_same_name_resolves_to_same_id_across_registries() {
    let db = create_test_db();

    let first = TeamRegistry::new(db.storage.clone()).resolve("Arsenal").unwrap();
    let again = TeamRegistry::new(db.storage.clone()).resolve("  ARSENAL ").unwrap();

    assert_eq!(first, again);
    let team = db.storage.get_team(first).unwrap().unwrap();
    assert_eq!(team.name, "Arsenal");
    assert_eq!(team.short_code.as_deref(), Some("ARS"));
}

#[test]
fn test_new_team_gets_display_name_and_derived_code() {
    let db = create_test_db();
    let registry = TeamRegistry::new(db.storage.clone());

    let id = registry.resolve("  Crystal   Palace ").unwrap();

    let team = db.storage.get_team(id).unwrap().unwrap();
    assert_eq!(team.name, "Crystal Palace");
    assert_eq!(team.short_code.as_deref(), Some("CPA"));
}

#[test]
fn test_builtin_alias_creates_canonical_team() {
    let db = create_test_db();
    let registry = TeamRegistry::new(db.storage.clone());

    let wolves = registry.resolve("Wolves").unwrap();

    let team = db.storage.get_team(wolves).unwrap().unwrap();
    assert_eq!(team.name, "Wolverhampton Wanderers");
    assert_eq!(team.short_code.as_deref(), Some("WOL"));
    assert_eq!(registry.resolve("Wolverhampton Wanderers").unwrap(), wolves);
}

#[test]
fn test_alias_updates_less_specific_short_code() {
    let db = create_test_db();
    let registry = TeamRegistry::new(db.storage.clone());

    let id = registry.resolve("Tottenham Hotspur").unwrap();
    assert_eq!(db.storage.get_team(id).unwrap().unwrap().short_code.as_deref(), Some("THO"));

    assert_eq!(registry.resolve("Spurs").unwrap(), id);
    assert_eq!(db.storage.get_team(id).unwrap().unwrap().short_code.as_deref(), Some("TOT"));
}

#[test]
fn test_short_code_input_resolves_existing_team() {
    let db = create_test_db();
    let registry = TeamRegistry::new(db.storage.clone());
    let arsenal = registry.resolve("Arsenal").unwrap();

    assert_eq!(TeamRegistry::new(db.storage.clone()).resolve("ars").unwrap(), arsenal);
    assert_eq!(db.storage.list_teams().unwrap().len(), 1);
}

#[test]
fn test_ambiguous_prefix_creates_nothing() {
    let db = create_test_db();
    let registry = TeamRegistry::new(db.storage.clone());
    registry.resolve("Manchester City").unwrap();
    registry.resolve("Manchester United").unwrap();

    let err = registry.resolve("Manchester").unwrap_err();

    match err {
        ServiceError::ResolutionAmbiguous { name, candidates } => {
            assert_eq!(name, "manchester");
            assert_eq!(candidates, vec!["Manchester City", "Manchester United"]);
        },
        other => panic!("expected ambiguity, got {other:?}"),
    }
    assert_eq!(db.storage.list_teams().unwrap().len(), 2);
    assert!(db.storage.find_alias("manchester").unwrap().is_none());
}

#[test]
fn test_ambiguous_short_code_creates_nothing() {
    let db = create_test_db();
    db.storage.insert_team("Newcastle United", Some("NEW")).unwrap();
    db.storage.insert_team("New York Red Bulls", Some("NEW")).unwrap();

    let err = TeamRegistry::new(db.storage.clone()).resolve("NEW").unwrap_err();

    assert!(matches!(err, ServiceError::ResolutionAmbiguous { .. }));
    assert_eq!(db.storage.list_teams().unwrap().len(), 2);
}

#[test]
fn test_unique_prefix_is_learned_and_stays_stable() {
    let db = create_test_db();
    let registry = TeamRegistry::new(db.storage.clone());
    let city = registry.resolve("Manchester City").unwrap();

    assert_eq!(registry.resolve("Manchester").unwrap(), city);

    // A second team sharing the prefix does not change the earlier answer.
    registry.resolve("Manchester United").unwrap();
    let fresh = TeamRegistry::new(db.storage.clone());
    assert_eq!(fresh.resolve("manchester").unwrap(), city);
}

#[test]
fn test_empty_name_is_invalid() {
    let db = create_test_db();
    let err = TeamRegistry::new(db.storage.clone()).resolve("   ").unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));
}

#[test]
fn test_lookup_never_writes() {
    let db = create_test_db();
    let registry = TeamRegistry::new(db.storage.clone());

    assert!(registry.lookup("Fulham").unwrap().is_none());
    assert!(registry.lookup("Spurs").unwrap().is_none());
    assert!(db.storage.list_teams().unwrap().is_empty());

    let fulham = registry.resolve("Fulham").unwrap();
    assert_eq!(registry.lookup("fulham").unwrap(), Some(fulham));
}

#[test]
fn test_create_plan_converges_on_row_stored_meanwhile() {
    let db = create_test_db();
    let registry = TeamRegistry::new(db.storage.clone());
    let plan = registry.plan("Brentford").unwrap();
    assert!(matches!(plan, TeamPlan::Create { .. }));

    let existing = db.storage.insert_team("Brentford", Some("BRE")).unwrap();

    assert_eq!(db.storage.apply_team_plan(&plan).unwrap(), existing);
    assert_eq!(db.storage.list_teams().unwrap().len(), 1);
}

#[test]
fn test_plan_writes_nothing() {
    let db = create_test_db();
    let registry = TeamRegistry::new(db.storage.clone());
    let city = registry.resolve("Manchester City").unwrap();

    let learn = registry.plan("Manchester").unwrap();
    let spurs = registry.plan("Spurs").unwrap();

    assert!(matches!(learn, TeamPlan::LearnAlias { id, .. } if id == city));
    assert!(matches!(spurs, TeamPlan::Create { ref name, .. } if name == "Tottenham Hotspur"));
    assert!(db.storage.find_alias("manchester").unwrap().is_none());
    assert_eq!(db.storage.list_teams().unwrap().len(), 1);
}

#[test]
fn test_concurrent_registries_converge() {
    let db = create_test_db();
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let storage = db.storage.clone();
            thread::spawn(move || TeamRegistry::new(storage).resolve("Fulham").unwrap())
        })
        .collect();
    let ids: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert!(ids.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(db.storage.list_teams().unwrap().len(), 1);
}
