//! Migration v7: league table per team, season and competition

use rusqlite::Connection;

const SQL: &str = "
CREATE TABLE IF NOT EXISTS team_overall_table_results (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    competition_id INTEGER NOT NULL REFERENCES competitions(id),
    team_id INTEGER NOT NULL REFERENCES teams(id),
    season TEXT NOT NULL,
    rk INTEGER,
    mp INTEGER,
    w INTEGER,
    d INTEGER,
    l INTEGER,
    gf INTEGER,
    ga INTEGER,
    gd INTEGER,
    pts INTEGER,
    pts_per_mp TEXT,
    xg TEXT,
    xga TEXT,
    xgd TEXT,
    xgd_per_90 TEXT,
    first_seen_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE (team_id, season, competition_id)
);

CREATE INDEX IF NOT EXISTS idx_team_overall_competition ON team_overall_table_results(competition_id);
CREATE INDEX IF NOT EXISTS idx_team_overall_season ON team_overall_table_results(season);
";

pub(super) fn apply(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SQL)
}
