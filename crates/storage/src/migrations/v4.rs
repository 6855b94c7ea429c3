//! Migration v4: team aliases, seeded with the built-in table

use chrono::Utc;
use rusqlite::{Connection, params};
use statlines_core::{BUILTIN_ALIASES, normalize_name};

const SQL: &str = "
CREATE TABLE IF NOT EXISTS team_aliases (
    alias_normalized TEXT PRIMARY KEY,
    canonical_name TEXT NOT NULL,
    short_code TEXT,
    source TEXT NOT NULL CHECK (source IN ('builtin', 'learned')),
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_team_aliases_canonical ON team_aliases(canonical_name);
";

pub(super) fn apply(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SQL)?;

    let now = Utc::now().to_rfc3339();
    let mut seed = conn.prepare(
        "INSERT INTO team_aliases (alias_normalized, canonical_name, short_code, source, created_at)
         VALUES (?1, ?2, ?3, 'builtin', ?4)
         ON CONFLICT(alias_normalized) DO NOTHING",
    )?;
    for alias in BUILTIN_ALIASES {
        seed.execute(params![normalize_name(alias.alias), alias.canonical, alias.short_code, now])?;
    }
    Ok(())
}
