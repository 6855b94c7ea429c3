use chrono::Utc;
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, TransactionBehavior, params};
use statlines_core::{
    CompetitionId, ExpectedGoals, FieldCorrection, MatchFields, MatchId, MatchRecord, MergeKind,
    MergeResult, NaturalKey, RawMatchRow, StoredMatch, TeamId, compute_merge,
};

use super::teams::{TeamPlan, tag_competition_on, write_team_plan};
use super::{Storage, get_conn, parse_timestamp};
use crate::error::StorageError;

const MATCH_COLUMNS: &str = "id, match_date, home_team_id, away_team_id, week_number, match_time,
    home_score, away_score, home_xg, away_xg, venue, attendance, referee, report_ref, notes,
    competition_id, first_seen_at, updated_at";

/// Outcome of applying one incoming record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchWrite {
    pub id: MatchId,
    pub key: NaturalKey,
    pub kind: MergeKind,
    pub corrections: Vec<FieldCorrection>,
}

impl Storage {
    /// Read the stored match under the record's natural key, merge, and write
    /// back, all inside one immediate transaction.
    ///
    /// # Errors
    /// Returns `Merge` if the stored row disagrees on the key, or a database
    /// error; in both cases nothing is committed.
    pub fn apply_match(&self, incoming: &MatchRecord) -> Result<MatchWrite, StorageError> {
        let mut conn = get_conn(&self.pool)?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let write = merge_match(&tx, incoming)?;
        tx.commit()?;
        Ok(write)
    }

    /// Store one ingested row as a single unit: the writes both team plans
    /// need, the competition tag on each team, and the merged match.
    ///
    /// # Errors
    /// Returns `Merge` if the row cannot become a record (both sides are the
    /// same team) or the stored row disagrees on the key, or a database
    /// error. Nothing from the row is committed in any of these cases.
    pub fn apply_match_row(
        &self,
        raw: &RawMatchRow,
        home: &TeamPlan,
        away: &TeamPlan,
        competition: Option<CompetitionId>,
    ) -> Result<MatchWrite, StorageError> {
        let mut conn = get_conn(&self.pool)?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let home_id = write_team_plan(&tx, home)?;
        let away_id = write_team_plan(&tx, away)?;
        let record = MatchRecord::from_raw(raw, home_id, away_id, competition)?;
        if let Some(competition_id) = competition {
            tag_competition_on(&tx, home_id, competition_id)?;
            tag_competition_on(&tx, away_id, competition_id)?;
        }
        let write = merge_match(&tx, &record)?;

        tx.commit()?;
        Ok(write)
    }

    /// # Errors
    /// Returns error if database query fails.
    pub fn get_match(&self, id: MatchId) -> Result<Option<StoredMatch>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let found = conn
            .query_row(
                &format!("SELECT {MATCH_COLUMNS} FROM matches WHERE id = ?1"),
                params![id.0],
                row_to_match,
            )
            .optional()?;
        Ok(found)
    }

    /// # Errors
    /// Returns error if database query fails.
    pub fn get_match_by_key(&self, key: &NaturalKey) -> Result<Option<StoredMatch>, StorageError> {
        let conn = get_conn(&self.pool)?;
        Ok(select_by_key(&conn, key)?)
    }

    /// # Errors
    /// Returns error if database query fails.
    pub fn count_matches(&self) -> Result<usize, StorageError> {
        let conn = get_conn(&self.pool)?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM matches", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

fn merge_match(conn: &Connection, incoming: &MatchRecord) -> Result<MatchWrite, StorageError> {
    let existing = select_by_key(conn, &incoming.key)?;
    let merged = compute_merge(existing.as_ref(), incoming, Utc::now())?;

    let id = match existing {
        Some(stored) => {
            update_match(conn, stored.id, &merged)?;
            stored.id
        },
        None => insert_match(conn, &merged)?,
    };

    Ok(MatchWrite { id, key: merged.key, kind: merged.kind, corrections: merged.corrections })
}

fn select_by_key(conn: &Connection, key: &NaturalKey) -> rusqlite::Result<Option<StoredMatch>> {
    conn.query_row(
        &format!(
            "SELECT {MATCH_COLUMNS} FROM matches
             WHERE match_date = ?1 AND home_team_id = ?2 AND away_team_id = ?3"
        ),
        params![key.match_date, key.home_team_id.0, key.away_team_id.0],
        row_to_match,
    )
    .optional()
}

fn insert_match(conn: &Connection, merged: &MergeResult) -> rusqlite::Result<MatchId> {
    let f = &merged.fields;
    conn.execute(
        "INSERT INTO matches
           (match_date, home_team_id, away_team_id, week_number, match_time, home_score, away_score,
            home_xg, away_xg, venue, attendance, referee, report_ref, notes, competition_id,
            first_seen_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
        params![
            merged.key.match_date,
            merged.key.home_team_id.0,
            merged.key.away_team_id.0,
            f.week_number,
            f.match_time,
            f.home_score,
            f.away_score,
            f.home_xg.map(|x| x.to_string()),
            f.away_xg.map(|x| x.to_string()),
            f.venue,
            f.attendance,
            f.referee,
            f.report_ref,
            f.notes,
            f.competition_id.map(|c| c.0),
            merged.first_seen_at.to_rfc3339(),
            merged.updated_at.to_rfc3339(),
        ],
    )?;
    Ok(MatchId(conn.last_insert_rowid()))
}

fn update_match(conn: &Connection, id: MatchId, merged: &MergeResult) -> rusqlite::Result<()> {
    let f = &merged.fields;
    conn.execute(
        "UPDATE matches SET
           week_number = ?1, match_time = ?2, home_score = ?3, away_score = ?4,
           home_xg = ?5, away_xg = ?6, venue = ?7, attendance = ?8, referee = ?9,
           report_ref = ?10, notes = ?11, competition_id = ?12, updated_at = ?13
         WHERE id = ?14",
        params![
            f.week_number,
            f.match_time,
            f.home_score,
            f.away_score,
            f.home_xg.map(|x| x.to_string()),
            f.away_xg.map(|x| x.to_string()),
            f.venue,
            f.attendance,
            f.referee,
            f.report_ref,
            f.notes,
            f.competition_id.map(|c| c.0),
            merged.updated_at.to_rfc3339(),
            id.0,
        ],
    )?;
    Ok(())
}

fn parse_xg(idx: usize, raw: Option<String>) -> rusqlite::Result<Option<ExpectedGoals>> {
    raw.map(|s| s.parse::<ExpectedGoals>())
        .transpose()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn row_to_match(row: &Row<'_>) -> rusqlite::Result<StoredMatch> {
    Ok(StoredMatch {
        id: MatchId(row.get(0)?),
        key: NaturalKey {
            match_date: row.get(1)?,
            home_team_id: TeamId(row.get(2)?),
            away_team_id: TeamId(row.get(3)?),
        },
        fields: MatchFields {
            week_number: row.get(4)?,
            match_time: row.get(5)?,
            home_score: row.get(6)?,
            away_score: row.get(7)?,
            home_xg: parse_xg(8, row.get(8)?)?,
            away_xg: parse_xg(9, row.get(9)?)?,
            venue: row.get(10)?,
            attendance: row.get(11)?,
            referee: row.get(12)?,
            report_ref: row.get(13)?,
            notes: row.get(14)?,
            competition_id: row.get::<_, Option<i64>>(15)?.map(CompetitionId),
        },
        first_seen_at: parse_timestamp(16, &row.get::<_, String>(16)?)?,
        updated_at: parse_timestamp(17, &row.get::<_, String>(17)?)?,
    })
}
