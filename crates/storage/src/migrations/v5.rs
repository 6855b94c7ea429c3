//! Migration v5: UNIQUE index on the match natural key

use rusqlite::Connection;

const SQL: &str = "
CREATE UNIQUE INDEX IF NOT EXISTS idx_matches_natural_key
    ON matches(match_date, home_team_id, away_team_id);
";

pub(super) fn apply(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SQL)
}
