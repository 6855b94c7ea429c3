//! Pure merge computation for incrementally discovered match facts.
//!
//! Storage backends pair a stored match with an incoming record under the
//! natural key and apply the returned fields; no I/O happens here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{MatchFields, MatchRecord, NaturalKey, RawMatchRow, StoredMatch};
use crate::field_merge::FieldMerger;
use crate::{CompetitionId, CoreError, TeamId};

/// What applying a merge result does to storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeKind {
    /// No stored match had this key.
    Created,
    /// At least one field changed.
    Updated,
    /// Every incoming value was absent or equal to the stored one.
    Unchanged,
}

/// A populated field replaced by a different populated value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldCorrection {
    pub field: &'static str,
    pub previous: String,
    pub current: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeResult {
    pub key: NaturalKey,
    pub fields: MatchFields,
    pub kind: MergeKind,
    /// Overwrites of previously populated values, for audit reporting.
    pub corrections: Vec<FieldCorrection>,
    pub first_seen_at: DateTime<Utc>,
    /// Refreshed on every merge, including unchanged ones.
    pub updated_at: DateTime<Utc>,
}

/// Natural key of a raw row once both team names are resolved.
///
/// # Errors
/// Returns `InvalidInput` if both sides resolved to the same team.
pub fn derive_key(row: &RawMatchRow, home: TeamId, away: TeamId) -> Result<NaturalKey, CoreError> {
    if home == away {
        return Err(CoreError::InvalidInput(format!(
            "home and away both resolve to team {home} ({:?} vs {:?})",
            row.home_team, row.away_team
        )));
    }
    Ok(NaturalKey { match_date: row.match_date, home_team_id: home, away_team_id: away })
}

impl MatchRecord {
    /// # Errors
    /// Propagates [`derive_key`] failures.
    pub fn from_raw(
        row: &RawMatchRow,
        home: TeamId,
        away: TeamId,
        competition_id: Option<CompetitionId>,
    ) -> Result<Self, CoreError> {
        Ok(Self {
            key: derive_key(row, home, away)?,
            fields: MatchFields::from_raw(row, competition_id),
        })
    }
}

/// Merge an incoming record into the stored match for the same key, if any.
///
/// # Merge rules
/// - **Identifying fields** must agree with the stored match, else `KeyMismatch`
/// - **Present incoming value** overwrites, including a different stored value
///   (recorded as a [`FieldCorrection`])
/// - **Absent incoming value** never erases a stored value
/// - **`updated_at`** is always `now`; `first_seen_at` is kept from the stored match
///
/// # Errors
/// Returns `KeyMismatch` when `existing` was stored under a different key.
pub fn compute_merge(
    existing: Option<&StoredMatch>,
    incoming: &MatchRecord,
    now: DateTime<Utc>,
) -> Result<MergeResult, CoreError> {
    let Some(stored) = existing else {
        return Ok(MergeResult {
            key: incoming.key,
            fields: incoming.fields.clone(),
            kind: MergeKind::Created,
            corrections: Vec::new(),
            first_seen_at: now,
            updated_at: now,
        });
    };

    if stored.key != incoming.key {
        return Err(CoreError::KeyMismatch { existing: stored.key, incoming: incoming.key });
    }

    let old = &stored.fields;
    let new = &incoming.fields;
    let mut m = FieldMerger::default();
    let fields = MatchFields {
        week_number: m.field("week_number", &old.week_number, &new.week_number),
        match_time: m.field("match_time", &old.match_time, &new.match_time),
        home_score: m.field("home_score", &old.home_score, &new.home_score),
        away_score: m.field("away_score", &old.away_score, &new.away_score),
        home_xg: m.field("home_xg", &old.home_xg, &new.home_xg),
        away_xg: m.field("away_xg", &old.away_xg, &new.away_xg),
        venue: m.field("venue", &old.venue, &new.venue),
        attendance: m.field("attendance", &old.attendance, &new.attendance),
        referee: m.field("referee", &old.referee, &new.referee),
        report_ref: m.field("report_ref", &old.report_ref, &new.report_ref),
        notes: m.field("notes", &old.notes, &new.notes),
        competition_id: m.field("competition_id", &old.competition_id, &new.competition_id),
    };

    let kind = if fields == *old { MergeKind::Unchanged } else { MergeKind::Updated };

    Ok(MergeResult {
        key: stored.key,
        fields,
        kind,
        corrections: m.corrections,
        first_seen_at: stored.first_seen_at,
        updated_at: now,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ExpectedGoals, MatchId};
    use chrono::NaiveDate;

    fn key(day: u32) -> NaturalKey {
        NaturalKey {
            match_date: NaiveDate::from_ymd_opt(2025, 1, day).unwrap(),
            home_team_id: TeamId(1),
            away_team_id: TeamId(2),
        }
    }

    fn stored(fields: MatchFields) -> StoredMatch {
        let t = Utc::now() - chrono::Duration::days(3);
        StoredMatch { id: MatchId(10), key: key(1), fields, first_seen_at: t, updated_at: t }
    }

    fn incoming(fields: MatchFields) -> MatchRecord {
        MatchRecord { key: key(1), fields }
    }

    #[test]
    fn merge_without_existing_creates() {
        let rec = incoming(MatchFields { venue: Some("Emirates Stadium".into()), ..Default::default() });
        let now = Utc::now();
        let result = compute_merge(None, &rec, now).unwrap();
        assert_eq!(result.kind, MergeKind::Created);
        assert_eq!(result.fields, rec.fields);
        assert_eq!(result.first_seen_at, now);
    }

    #[test]
    fn merge_absent_value_never_erases() {
        let existing = stored(MatchFields {
            venue: Some("Emirates Stadium".into()),
            attendance: Some(60_100),
            ..Default::default()
        });
        let rec = incoming(MatchFields { home_score: Some(2), away_score: Some(1), ..Default::default() });

        let result = compute_merge(Some(&existing), &rec, Utc::now()).unwrap();
        assert_eq!(result.kind, MergeKind::Updated);
        assert_eq!(result.fields.venue.as_deref(), Some("Emirates Stadium"));
        assert_eq!(result.fields.attendance, Some(60_100));
        assert_eq!(result.fields.home_score, Some(2));
        assert!(result.corrections.is_empty());
    }

    #[test]
    fn merge_identical_input_is_unchanged_but_refreshes_timestamp() {
        let fields = MatchFields { referee: Some("Michael Oliver".into()), ..Default::default() };
        let existing = stored(fields.clone());
        let now = Utc::now();

        let result = compute_merge(Some(&existing), &incoming(fields), now).unwrap();
        assert_eq!(result.kind, MergeKind::Unchanged);
        assert_eq!(result.updated_at, now);
        assert_eq!(result.first_seen_at, existing.first_seen_at);
    }

    #[test]
    fn merge_different_value_is_a_flagged_correction() {
        let existing = stored(MatchFields {
            attendance: Some(60_100),
            home_xg: Some(ExpectedGoals::from_hundredths(120)),
            ..Default::default()
        });
        let rec = incoming(MatchFields {
            attendance: Some(60_245),
            home_xg: Some(ExpectedGoals::from_hundredths(120)),
            ..Default::default()
        });

        let result = compute_merge(Some(&existing), &rec, Utc::now()).unwrap();
        assert_eq!(result.fields.attendance, Some(60_245));
        assert_eq!(
            result.corrections,
            vec![FieldCorrection {
                field: "attendance",
                previous: "60100".into(),
                current: "60245".into(),
            }]
        );
    }

    #[test]
    fn merge_first_population_is_not_a_correction() {
        let existing = stored(MatchFields::default());
        let rec = incoming(MatchFields { referee: Some("Anthony Taylor".into()), ..Default::default() });
        let result = compute_merge(Some(&existing), &rec, Utc::now()).unwrap();
        assert!(result.corrections.is_empty());
        assert_eq!(result.kind, MergeKind::Updated);
    }

    #[test]
    fn merge_rejects_key_mismatch() {
        let existing = stored(MatchFields::default());
        let rec = MatchRecord { key: key(2), fields: MatchFields::default() };
        let err = compute_merge(Some(&existing), &rec, Utc::now()).unwrap_err();
        assert!(matches!(err, CoreError::KeyMismatch { .. }));
    }

    #[test]
    fn merge_is_idempotent_when_reapplied() {
        let existing = stored(MatchFields { venue: Some("Anfield".into()), ..Default::default() });
        let rec = incoming(MatchFields { home_score: Some(3), ..Default::default() });
        let first = compute_merge(Some(&existing), &rec, Utc::now()).unwrap();

        let after_first = StoredMatch { fields: first.fields.clone(), ..existing };
        let second = compute_merge(Some(&after_first), &rec, Utc::now()).unwrap();
        assert_eq!(second.kind, MergeKind::Unchanged);
        assert_eq!(second.fields, first.fields);
    }

    #[test]
    fn derive_key_rejects_same_team_both_sides() {
        let row = RawMatchRow::fixture(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(), "Spurs", "Tottenham");
        assert!(derive_key(&row, TeamId(4), TeamId(4)).is_err());
        assert_eq!(derive_key(&row, TeamId(4), TeamId(5)).unwrap().away_team_id, TeamId(5));
    }
}
