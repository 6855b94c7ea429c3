//! Migration v8: home and away league table

use rusqlite::Connection;

const SQL: &str = "
CREATE TABLE IF NOT EXISTS team_home_away_table_results (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    competition_id INTEGER NOT NULL REFERENCES competitions(id),
    team_id INTEGER NOT NULL REFERENCES teams(id),
    season TEXT NOT NULL,
    home_mp INTEGER,
    home_w INTEGER,
    home_d INTEGER,
    home_l INTEGER,
    home_gf INTEGER,
    home_ga INTEGER,
    home_gd INTEGER,
    home_pts INTEGER,
    home_pts_per_mp TEXT,
    home_xg TEXT,
    home_xga TEXT,
    home_xgd TEXT,
    home_xgd_per_90 TEXT,
    away_mp INTEGER,
    away_w INTEGER,
    away_d INTEGER,
    away_l INTEGER,
    away_gf INTEGER,
    away_ga INTEGER,
    away_gd INTEGER,
    away_pts INTEGER,
    away_pts_per_mp TEXT,
    away_xg TEXT,
    away_xga TEXT,
    away_xgd TEXT,
    away_xgd_per_90 TEXT,
    first_seen_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE (team_id, season, competition_id)
);

CREATE INDEX IF NOT EXISTS idx_team_home_away_competition ON team_home_away_table_results(competition_id);
CREATE INDEX IF NOT EXISTS idx_team_home_away_season ON team_home_away_table_results(season);
";

pub(super) fn apply(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SQL)
}
