use chrono::Utc;
use rusqlite::types::{Type, Value};
use rusqlite::{Connection, OptionalExtension, Row, TransactionBehavior, params, params_from_iter};
use statlines_core::{
    CompetitionId, FieldCorrection, MergeKind, StatDecimal, StatKind, StatTable, StatValue,
    StatValues, StatsMergeResult, StoredTeamStats, TeamId, TeamStatsId, TeamStatsKey,
    TeamStatsRecord, compute_stats_merge,
};

use super::teams::{TeamPlan, tag_competition_on, write_team_plan};
use super::{Storage, get_conn, parse_timestamp};
use crate::error::StorageError;

/// Leading columns every stats table shares, ahead of its stat columns.
const KEY_COLUMNS: &str = "id, team_id, season, competition_id, first_seen_at, updated_at";
const STATS_OFFSET: usize = 6;

/// Outcome of applying one team's season stats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsWrite {
    pub id: TeamStatsId,
    pub key: TeamStatsKey,
    pub kind: MergeKind,
    pub corrections: Vec<FieldCorrection>,
}

impl Storage {
    /// Merge one team's season stats into its row, in one immediate transaction.
    ///
    /// # Errors
    /// Returns `Merge` if the stored row disagrees on the key, or a database error.
    pub fn apply_team_stats(&self, incoming: &TeamStatsRecord) -> Result<StatsWrite, StorageError> {
        let mut conn = get_conn(&self.pool)?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let write = merge_stats(&tx, incoming)?;
        tx.commit()?;
        Ok(write)
    }

    /// Store one scraped stats row as a single unit: the team plan, the
    /// competition tag on the team, and the merged stats.
    ///
    /// # Errors
    /// Returns `Merge` or a database error; nothing from the row is committed.
    pub fn apply_team_stats_row(
        &self,
        table: StatTable,
        team: &TeamPlan,
        competition_id: CompetitionId,
        season: &str,
        values: &StatValues,
    ) -> Result<StatsWrite, StorageError> {
        let mut conn = get_conn(&self.pool)?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let team_id = write_team_plan(&tx, team)?;
        tag_competition_on(&tx, team_id, competition_id)?;
        let record = TeamStatsRecord {
            key: TeamStatsKey { table, team_id, season: season.to_owned(), competition_id },
            values: values.clone(),
        };
        let write = merge_stats(&tx, &record)?;

        tx.commit()?;
        Ok(write)
    }

    /// # Errors
    /// Returns error if database query fails.
    pub fn get_team_stats(&self, key: &TeamStatsKey) -> Result<Option<StoredTeamStats>, StorageError> {
        let conn = get_conn(&self.pool)?;
        Ok(select_by_key(&conn, key)?)
    }

    /// Every stored season of one table for a team, oldest season first.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn list_team_stats(
        &self,
        table: StatTable,
        team_id: TeamId,
    ) -> Result<Vec<StoredTeamStats>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM {} WHERE team_id = ?1 ORDER BY season, competition_id",
            select_columns(table),
            table.table_name()
        ))?;
        let rows = stmt.query_map(params![team_id.0], |row| row_to_stats(table, row))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// # Errors
    /// Returns error if database query fails.
    pub fn count_team_stats(&self, table: StatTable) -> Result<usize, StorageError> {
        let conn = get_conn(&self.pool)?;
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", table.table_name()),
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

fn merge_stats(conn: &Connection, incoming: &TeamStatsRecord) -> Result<StatsWrite, StorageError> {
    let existing = select_by_key(conn, &incoming.key)?;
    let merged = compute_stats_merge(existing.as_ref(), incoming, Utc::now())?;

    let id = match existing {
        Some(stored) => {
            update_stats(conn, stored.id, &merged)?;
            stored.id
        },
        None => insert_stats(conn, &merged)?,
    };

    Ok(StatsWrite { id, key: merged.key, kind: merged.kind, corrections: merged.corrections })
}

fn select_columns(table: StatTable) -> String {
    let mut columns = KEY_COLUMNS.to_owned();
    for column in table.columns() {
        columns.push_str(", ");
        columns.push_str(column.name);
    }
    columns
}

/// One SQL value per stat column, `NULL` for absent stats.
fn stat_params(table: StatTable, values: &StatValues) -> Vec<Value> {
    table
        .columns()
        .iter()
        .map(|column| match values.get(column.name) {
            Some(StatValue::Count(n)) => Value::Integer(*n),
            Some(StatValue::Decimal(d)) => Value::Text(d.as_str().to_owned()),
            None => Value::Null,
        })
        .collect()
}

fn select_by_key(conn: &Connection, key: &TeamStatsKey) -> rusqlite::Result<Option<StoredTeamStats>> {
    conn.query_row(
        &format!(
            "SELECT {} FROM {} WHERE team_id = ?1 AND season = ?2 AND competition_id = ?3",
            select_columns(key.table),
            key.table.table_name()
        ),
        params![key.team_id.0, key.season, key.competition_id.0],
        |row| row_to_stats(key.table, row),
    )
    .optional()
}

fn insert_stats(conn: &Connection, merged: &StatsMergeResult) -> rusqlite::Result<TeamStatsId> {
    let table = merged.key.table;
    let names: Vec<&str> = table.columns().iter().map(|c| c.name).collect();
    let placeholders = vec!["?"; names.len() + 5].join(", ");

    let mut values = vec![
        Value::Integer(merged.key.team_id.0),
        Value::Text(merged.key.season.clone()),
        Value::Integer(merged.key.competition_id.0),
        Value::Text(merged.first_seen_at.to_rfc3339()),
        Value::Text(merged.updated_at.to_rfc3339()),
    ];
    values.extend(stat_params(table, &merged.values));

    conn.execute(
        &format!(
            "INSERT INTO {} (team_id, season, competition_id, first_seen_at, updated_at, {})
             VALUES ({placeholders})",
            table.table_name(),
            names.join(", ")
        ),
        params_from_iter(values),
    )?;
    Ok(TeamStatsId(conn.last_insert_rowid()))
}

fn update_stats(conn: &Connection, id: TeamStatsId, merged: &StatsMergeResult) -> rusqlite::Result<()> {
    let table = merged.key.table;
    let assignments: Vec<String> =
        table.columns().iter().map(|c| format!("{} = ?", c.name)).collect();

    let mut values = stat_params(table, &merged.values);
    values.push(Value::Text(merged.updated_at.to_rfc3339()));
    values.push(Value::Integer(id.0));

    conn.execute(
        &format!(
            "UPDATE {} SET {}, updated_at = ? WHERE id = ?",
            table.table_name(),
            assignments.join(", ")
        ),
        params_from_iter(values),
    )?;
    Ok(())
}

fn row_to_stats(table: StatTable, row: &Row<'_>) -> rusqlite::Result<StoredTeamStats> {
    let mut values = StatValues::new();
    for (offset, column) in table.columns().iter().enumerate() {
        let idx = STATS_OFFSET + offset;
        let value = match column.kind {
            StatKind::Count => row.get::<_, Option<i64>>(idx)?.map(StatValue::Count),
            StatKind::Decimal => row
                .get::<_, Option<String>>(idx)?
                .map(|s| s.parse::<StatDecimal>())
                .transpose()
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))?
                .map(StatValue::Decimal),
        };
        if let Some(value) = value {
            values.insert(column.name, value);
        }
    }

    Ok(StoredTeamStats {
        id: TeamStatsId(row.get(0)?),
        key: TeamStatsKey {
            table,
            team_id: TeamId(row.get(1)?),
            season: row.get(2)?,
            competition_id: CompetitionId(row.get(3)?),
        },
        values,
        first_seen_at: parse_timestamp(4, &row.get::<_, String>(4)?)?,
        updated_at: parse_timestamp(5, &row.get::<_, String>(5)?)?,
    })
}
