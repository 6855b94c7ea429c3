//! Migration v10: goalkeeping stats against each squad

use rusqlite::Connection;

const SQL: &str = "
CREATE TABLE IF NOT EXISTS team_squad_keeper_against (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    competition_id INTEGER NOT NULL REFERENCES competitions(id),
    team_id INTEGER NOT NULL REFERENCES teams(id),
    season TEXT NOT NULL,
    player_number TEXT,
    matches_played INTEGER,
    matches_started INTEGER,
    minutes_played INTEGER,
    minutes_played_90s TEXT,
    goals_against INTEGER,
    goals_against_90s TEXT,
    shot_on_target_against INTEGER,
    saves INTEGER,
    save_percentage TEXT,
    wins INTEGER,
    draws INTEGER,
    losses INTEGER,
    clean_sheets INTEGER,
    clean_sheets_percentage TEXT,
    penalties_attempted INTEGER,
    penalties_allowed INTEGER,
    penalties_saved INTEGER,
    penalties_missed INTEGER,
    penalties_saved_percentage TEXT,
    first_seen_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE (team_id, season, competition_id)
);

CREATE INDEX IF NOT EXISTS idx_team_keeper_against_competition ON team_squad_keeper_against(competition_id);
CREATE INDEX IF NOT EXISTS idx_team_keeper_against_season ON team_squad_keeper_against(season);
";

pub(super) fn apply(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SQL)
}
