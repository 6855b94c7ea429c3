//! Migration v9: squad standard stats

use rusqlite::Connection;

const SQL: &str = "
CREATE TABLE IF NOT EXISTS team_squad_standard_for (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    competition_id INTEGER NOT NULL REFERENCES competitions(id),
    team_id INTEGER NOT NULL REFERENCES teams(id),
    season TEXT NOT NULL,
    player_number TEXT,
    age TEXT,
    possession TEXT,
    matches_played INTEGER,
    matches_started INTEGER,
    minutes_played INTEGER,
    minutes_played_90s TEXT,
    goals INTEGER,
    assists INTEGER,
    goals_and_assists INTEGER,
    goals_minus_penalties INTEGER,
    penalties INTEGER,
    penalties_attempted INTEGER,
    yellow_cards INTEGER,
    red_cards INTEGER,
    expected_goals TEXT,
    non_penalty_expected_goals TEXT,
    expected_assisted_goals TEXT,
    npxg_plus_xag TEXT,
    progressive_carries INTEGER,
    progressive_passes INTEGER,
    goals_per90 TEXT,
    assists_per90 TEXT,
    goals_and_assists_per90 TEXT,
    goals_minus_penalties_per90 TEXT,
    goals_and_assists_minus_penalties_per90 TEXT,
    expected_goals_per90 TEXT,
    expected_assisted_goals_per90 TEXT,
    expected_goals_and_assists_per90 TEXT,
    non_penalty_expected_goals_per90 TEXT,
    npxg_plus_xag_per90 TEXT,
    first_seen_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE (team_id, season, competition_id)
);

CREATE INDEX IF NOT EXISTS idx_team_squad_standard_competition ON team_squad_standard_for(competition_id);
CREATE INDEX IF NOT EXISTS idx_team_squad_standard_season ON team_squad_standard_for(season);
";

pub(super) fn apply(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SQL)
}
