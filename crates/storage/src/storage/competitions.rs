use rusqlite::{OptionalExtension, Row, params};
use statlines_core::{Competition, CompetitionId};

use super::{Storage, get_conn};
use crate::error::StorageError;

impl Storage {
    /// Find a competition by short name (`EPL`, `LaLiga`, ...), ignoring case.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn get_competition_by_short_name(
        &self,
        short_name: &str,
    ) -> Result<Option<Competition>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let competition = conn
            .query_row(
                "SELECT id, name, short_name, country, source_id FROM competitions
                 WHERE short_name = ?1 COLLATE NOCASE",
                params![short_name.trim()],
                row_to_competition,
            )
            .optional()?;
        Ok(competition)
    }

    /// # Errors
    /// Returns error if database query fails.
    pub fn list_competitions(&self) -> Result<Vec<Competition>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(
            "SELECT id, name, short_name, country, source_id FROM competitions ORDER BY id",
        )?;
        let rows = stmt.query_map([], row_to_competition)?.collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

fn row_to_competition(row: &Row<'_>) -> rusqlite::Result<Competition> {
    Ok(Competition {
        id: CompetitionId(row.get(0)?),
        name: row.get(1)?,
        short_name: row.get(2)?,
        country: row.get(3)?,
        source_id: row.get(4)?,
    })
}
