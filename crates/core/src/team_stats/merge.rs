use chrono::{DateTime, Utc};

use super::{StatValues, StoredTeamStats, TeamStatsKey, TeamStatsRecord};
use crate::field_merge::FieldMerger;
use crate::{CoreError, FieldCorrection, MergeKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsMergeResult {
    pub key: TeamStatsKey,
    pub values: StatValues,
    pub kind: MergeKind,
    pub corrections: Vec<FieldCorrection>,
    pub first_seen_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Merge incoming season stats into the stored row for the same key.
///
/// Same rules as match merging: an absent stat never erases a stored one,
/// and a different present stat replaces it as a correction.
///
/// # Errors
/// Returns `StatsKeyMismatch` when `existing` was stored under a different key.
pub fn compute_stats_merge(
    existing: Option<&StoredTeamStats>,
    incoming: &TeamStatsRecord,
    now: DateTime<Utc>,
) -> Result<StatsMergeResult, CoreError> {
    let Some(stored) = existing else {
        return Ok(StatsMergeResult {
            key: incoming.key.clone(),
            values: incoming.values.clone(),
            kind: MergeKind::Created,
            corrections: Vec::new(),
            first_seen_at: now,
            updated_at: now,
        });
    };

    if stored.key != incoming.key {
        return Err(CoreError::StatsKeyMismatch {
            existing: stored.key.clone(),
            incoming: incoming.key.clone(),
        });
    }

    let mut m = FieldMerger::default();
    let mut values = StatValues::new();
    for column in incoming.key.table.columns() {
        let merged = m.field(
            column.name,
            &stored.values.get(column.name).cloned(),
            &incoming.values.get(column.name).cloned(),
        );
        if let Some(value) = merged {
            values.insert(column.name, value);
        }
    }

    let kind = if values == stored.values { MergeKind::Unchanged } else { MergeKind::Updated };

    Ok(StatsMergeResult {
        key: stored.key.clone(),
        values,
        kind,
        corrections: m.corrections,
        first_seen_at: stored.first_seen_at,
        updated_at: now,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CompetitionId, StatTable, StatValue, TeamId, TeamStatsId};

    fn key(season: &str) -> TeamStatsKey {
        TeamStatsKey {
            table: StatTable::Overall,
            team_id: TeamId(3),
            season: season.to_owned(),
            competition_id: CompetitionId(1),
        }
    }

    fn values(pairs: &[(&'static str, i64)]) -> StatValues {
        pairs.iter().map(|(name, n)| (*name, StatValue::Count(*n))).collect()
    }

    fn stored(pairs: &[(&'static str, i64)]) -> StoredTeamStats {
        let t = Utc::now() - chrono::Duration::days(7);
        StoredTeamStats {
            id: TeamStatsId(1),
            key: key("2024-2025"),
            values: values(pairs),
            first_seen_at: t,
            updated_at: t,
        }
    }

    #[test]
    fn absent_stat_keeps_stored_value() {
        let existing = stored(&[("mp", 30), ("pts", 60)]);
        let rec = TeamStatsRecord { key: key("2024-2025"), values: values(&[("mp", 31)]) };

        let result = compute_stats_merge(Some(&existing), &rec, Utc::now()).unwrap();
        assert_eq!(result.kind, MergeKind::Updated);
        assert_eq!(result.values, values(&[("mp", 31), ("pts", 60)]));
        assert_eq!(result.corrections.len(), 1);
        assert_eq!(result.corrections[0].field, "mp");
        assert_eq!(result.first_seen_at, existing.first_seen_at);
    }

    #[test]
    fn same_stats_are_unchanged() {
        let existing = stored(&[("mp", 38)]);
        let rec = TeamStatsRecord { key: key("2024-2025"), values: values(&[("mp", 38)]) };
        let result = compute_stats_merge(Some(&existing), &rec, Utc::now()).unwrap();
        assert_eq!(result.kind, MergeKind::Unchanged);
        assert!(result.corrections.is_empty());
    }

    #[test]
    fn other_season_is_a_key_mismatch() {
        let existing = stored(&[("mp", 38)]);
        let rec = TeamStatsRecord { key: key("2023-2024"), values: values(&[("mp", 38)]) };
        let err = compute_stats_merge(Some(&existing), &rec, Utc::now()).unwrap_err();
        assert!(matches!(err, CoreError::StatsKeyMismatch { .. }));
    }
}
