//! Migration v2: competitions, with every existing match tagged as Premier League

use chrono::Utc;
use rusqlite::{Connection, params};
use statlines_core::BUILTIN_COMPETITIONS;
use statlines_core::constants::DEFAULT_COMPETITION;

use super::column_helpers::add_column_if_not_exists;

const SQL: &str = "
CREATE TABLE IF NOT EXISTS competitions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    short_name TEXT,
    country TEXT,
    source_id INTEGER UNIQUE,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
";

pub(super) fn apply(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SQL)?;

    let now = Utc::now().to_rfc3339();
    let mut seed = conn.prepare(
        "INSERT INTO competitions (name, short_name, country, source_id, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?5)
         ON CONFLICT(source_id) DO NOTHING",
    )?;
    for c in BUILTIN_COMPETITIONS {
        seed.execute(params![c.name, c.short_name, c.country, c.source_id, now])?;
    }

    add_column_if_not_exists(conn, "matches", "competition_id", "INTEGER REFERENCES competitions(id)")?;
    conn.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_matches_competition ON matches(competition_id);",
    )?;

    let tagged = conn.execute(
        "UPDATE matches
         SET competition_id = (SELECT id FROM competitions WHERE short_name = ?1)
         WHERE competition_id IS NULL",
        params![DEFAULT_COMPETITION],
    )?;
    tracing::info!(tagged, "Back-filled competition on existing matches");
    Ok(())
}
