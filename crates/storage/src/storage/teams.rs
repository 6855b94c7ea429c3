use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Row, TransactionBehavior, params};
use statlines_core::{CompetitionId, Team, TeamId, normalize_name};

use super::{Storage, get_conn, parse_timestamp};
use crate::error::StorageError;

const TEAM_COLUMNS: &str = "id, name, short_code, competition_id, created_at, updated_at";

/// The writes that turn one resolved team name into a [`TeamId`].
///
/// Produced by read-only resolution and applied later inside the
/// transaction of the row that needs the team, so a row that fails leaves
/// no team, alias or short code behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TeamPlan {
    /// Already stored; nothing to write.
    Existing(TeamId),
    /// Stored team reached through a partial name that should be remembered.
    LearnAlias { id: TeamId, alias: String, canonical_name: String },
    /// Stored team whose short code becomes `short_code`.
    SetShortCode { id: TeamId, short_code: String },
    /// Not stored yet.
    Create { name: String, short_code: Option<String> },
}

impl TeamPlan {
    /// The stored id, when the team already exists.
    #[must_use]
    pub const fn known_id(&self) -> Option<TeamId> {
        match self {
            Self::Existing(id) | Self::LearnAlias { id, .. } | Self::SetShortCode { id, .. } => {
                Some(*id)
            },
            Self::Create { .. } => None,
        }
    }

    /// Whether both plans end at the same team.
    #[must_use]
    pub fn same_team(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Create { name: a, .. }, Self::Create { name: b, .. }) => {
                normalize_name(a) == normalize_name(b)
            },
            _ => self.known_id().is_some() && self.known_id() == other.known_id(),
        }
    }
}

/// Alias lookup hit: the canonical name the alias stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamAliasRow {
    pub canonical_name: String,
    pub short_code: Option<String>,
}

impl Storage {
    /// Get a team by id.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn get_team(&self, id: TeamId) -> Result<Option<Team>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let team = conn
            .query_row(
                &format!("SELECT {TEAM_COLUMNS} FROM teams WHERE id = ?1"),
                params![id.0],
                Self::row_to_team,
            )
            .optional()?;
        Ok(team)
    }

    /// Get a team by canonical name; whitespace and case are ignored.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn get_team_by_name(&self, name: &str) -> Result<Option<Team>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let team = conn
            .query_row(
                &format!("SELECT {TEAM_COLUMNS} FROM teams WHERE name_normalized = ?1"),
                params![normalize_name(name)],
                Self::row_to_team,
            )
            .optional()?;
        Ok(team)
    }

    /// All teams ordered by id.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn list_teams(&self) -> Result<Vec<Team>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(&format!("SELECT {TEAM_COLUMNS} FROM teams ORDER BY id"))?;
        let teams = stmt.query_map([], Self::row_to_team)?.collect::<Result<Vec<_>, _>>()?;
        Ok(teams)
    }

    /// Canonical names of teams carrying `code` as short code.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn team_names_by_short_code(&self, code: &str) -> Result<Vec<String>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let mut stmt =
            conn.prepare("SELECT name FROM teams WHERE short_code = ?1 COLLATE NOCASE ORDER BY id")?;
        let names = stmt
            .query_map(params![code.trim()], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    /// Look up an alias by its normalized form.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn find_alias(&self, alias_normalized: &str) -> Result<Option<TeamAliasRow>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let row = conn
            .query_row(
                "SELECT canonical_name, short_code FROM team_aliases WHERE alias_normalized = ?1",
                params![alias_normalized],
                |row| Ok(TeamAliasRow { canonical_name: row.get(0)?, short_code: row.get(1)? }),
            )
            .optional()?;
        Ok(row)
    }

    /// Remember that `alias` resolved to `canonical_name`.
    ///
    /// Returns `false` when the alias was already known; an existing alias is never repointed.
    ///
    /// # Errors
    /// Returns error if database insert fails.
    pub fn learn_alias(&self, alias: &str, canonical_name: &str) -> Result<bool, StorageError> {
        let conn = get_conn(&self.pool)?;
        Ok(learn_alias_on(&conn, alias, canonical_name)?)
    }

    /// Insert a new team.
    ///
    /// # Errors
    /// Returns `Duplicate` if a team with the same normalized name already
    /// exists (including one inserted concurrently), or a database error.
    pub fn insert_team(&self, name: &str, short_code: Option<&str>) -> Result<TeamId, StorageError> {
        let conn = get_conn(&self.pool)?;
        Ok(insert_team_on(&conn, name, short_code)?)
    }

    /// Replace a team's short code, touching `updated_at` only on change.
    ///
    /// # Errors
    /// Returns error if database update fails.
    pub fn set_team_short_code(&self, id: TeamId, short_code: &str) -> Result<bool, StorageError> {
        let conn = get_conn(&self.pool)?;
        Ok(set_short_code_on(&conn, id, short_code)?)
    }

    /// Record the competition a team was first seen in. An existing tag is kept.
    ///
    /// # Errors
    /// Returns error if database update fails.
    pub fn tag_team_competition(
        &self,
        id: TeamId,
        competition_id: CompetitionId,
    ) -> Result<bool, StorageError> {
        let conn = get_conn(&self.pool)?;
        Ok(tag_competition_on(&conn, id, competition_id)?)
    }

    /// Apply a [`TeamPlan`] on its own, in one immediate transaction.
    ///
    /// A `Create` whose name was stored by another writer since the plan
    /// was made converges on that row instead of failing.
    ///
    /// # Errors
    /// Returns error if database write fails.
    pub fn apply_team_plan(&self, plan: &TeamPlan) -> Result<TeamId, StorageError> {
        let mut conn = get_conn(&self.pool)?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let id = write_team_plan(&tx, plan)?;
        tx.commit()?;
        Ok(id)
    }

    fn row_to_team(row: &Row<'_>) -> rusqlite::Result<Team> {
        Ok(Team {
            id: TeamId(row.get(0)?),
            name: row.get(1)?,
            short_code: row.get(2)?,
            competition_id: row.get::<_, Option<i64>>(3)?.map(CompetitionId),
            created_at: parse_timestamp(4, &row.get::<_, String>(4)?)?,
            updated_at: parse_timestamp(5, &row.get::<_, String>(5)?)?,
        })
    }
}

/// Perform the writes of `plan` on `conn`, which is expected to hold the
/// write lock of the caller's transaction.
pub(crate) fn write_team_plan(conn: &Connection, plan: &TeamPlan) -> rusqlite::Result<TeamId> {
    match plan {
        TeamPlan::Existing(id) => Ok(*id),
        TeamPlan::LearnAlias { id, alias, canonical_name } => {
            if learn_alias_on(conn, alias, canonical_name)? {
                tracing::debug!(alias = %alias, team = %canonical_name, "Learned team alias");
            }
            Ok(*id)
        },
        TeamPlan::SetShortCode { id, short_code } => {
            set_short_code_on(conn, *id, short_code)?;
            Ok(*id)
        },
        TeamPlan::Create { name, short_code } => {
            let existing: Option<i64> = conn
                .query_row(
                    "SELECT id FROM teams WHERE name_normalized = ?1",
                    params![normalize_name(name)],
                    |row| row.get(0),
                )
                .optional()?;
            match existing {
                Some(id) => Ok(TeamId(id)),
                None => insert_team_on(conn, name, short_code.as_deref()),
            }
        },
    }
}

fn insert_team_on(conn: &Connection, name: &str, short_code: Option<&str>) -> rusqlite::Result<TeamId> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO teams (name, name_normalized, short_code, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?4)",
        params![name, normalize_name(name), short_code, now],
    )?;
    Ok(TeamId(conn.last_insert_rowid()))
}

fn learn_alias_on(conn: &Connection, alias: &str, canonical_name: &str) -> rusqlite::Result<bool> {
    let inserted = conn.execute(
        "INSERT INTO team_aliases (alias_normalized, canonical_name, short_code, source, created_at)
         VALUES (?1, ?2, NULL, 'learned', ?3)
         ON CONFLICT(alias_normalized) DO NOTHING",
        params![normalize_name(alias), canonical_name, Utc::now().to_rfc3339()],
    )?;
    Ok(inserted > 0)
}

fn set_short_code_on(conn: &Connection, id: TeamId, short_code: &str) -> rusqlite::Result<bool> {
    let changed = conn.execute(
        "UPDATE teams SET short_code = ?1, updated_at = ?2
         WHERE id = ?3 AND (short_code IS NULL OR short_code != ?1)",
        params![short_code, Utc::now().to_rfc3339(), id.0],
    )?;
    Ok(changed > 0)
}

pub(crate) fn tag_competition_on(
    conn: &Connection,
    id: TeamId,
    competition_id: CompetitionId,
) -> rusqlite::Result<bool> {
    let changed = conn.execute(
        "UPDATE teams SET competition_id = ?1, updated_at = ?2
         WHERE id = ?3 AND competition_id IS NULL",
        params![competition_id.0, Utc::now().to_rfc3339(), id.0],
    )?;
    Ok(changed > 0)
}
