//! Migration v11: advanced goalkeeping stats
//!
//! Created with a `penalties_saved_percentage` column that belongs to the
//! keeper-against table; v12 removes it.

use rusqlite::Connection;

const SQL: &str = "
CREATE TABLE IF NOT EXISTS team_squad_keeper_adv_for (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    competition_id INTEGER NOT NULL REFERENCES competitions(id),
    team_id INTEGER NOT NULL REFERENCES teams(id),
    season TEXT NOT NULL,
    free_kick_goals_against INTEGER,
    corner_kick_goals_against INTEGER,
    own_goals_against INTEGER,
    post_shot_xg TEXT,
    post_shot_xg_per_shot_ot TEXT,
    post_shot_xg_minus_goals_allowed TEXT,
    post_shot_xg_minus_goals_allowed_90s TEXT,
    completed_long_balls INTEGER,
    attempted_long_balls INTEGER,
    long_balls_completed_percentage TEXT,
    passes_attempted INTEGER,
    throws_attempted INTEGER,
    launch_percentage TEXT,
    avg_pass_length TEXT,
    goal_kicks INTEGER,
    goal_kicks_launched_percentage TEXT,
    goal_kicks_avg_length TEXT,
    crosses_faced INTEGER,
    crosses_stopped INTEGER,
    crosses_stopped_percentage TEXT,
    def_actions_outside_of_penalty_area INTEGER,
    def_actions_outside_of_penalty_area_90s TEXT,
    avg_def_action_dist TEXT,
    penalties_saved_percentage TEXT,
    first_seen_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE (team_id, season, competition_id)
);

CREATE INDEX IF NOT EXISTS idx_team_keeper_adv_competition ON team_squad_keeper_adv_for(competition_id);
CREATE INDEX IF NOT EXISTS idx_team_keeper_adv_season ON team_squad_keeper_adv_for(season);
";

pub(super) fn apply(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SQL)
}
