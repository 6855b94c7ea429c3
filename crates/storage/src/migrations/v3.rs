//! Migration v3: competition on teams

use rusqlite::{Connection, params};
use statlines_core::constants::DEFAULT_COMPETITION;

use super::column_helpers::add_column_if_not_exists;

pub(super) fn apply(conn: &Connection) -> rusqlite::Result<()> {
    add_column_if_not_exists(conn, "teams", "competition_id", "INTEGER REFERENCES competitions(id)")?;
    conn.execute_batch("CREATE INDEX IF NOT EXISTS idx_teams_competition ON teams(competition_id);")?;
    conn.execute(
        "UPDATE teams
         SET competition_id = (SELECT id FROM competitions WHERE short_name = ?1)
         WHERE competition_id IS NULL",
        params![DEFAULT_COMPETITION],
    )?;
    Ok(())
}
