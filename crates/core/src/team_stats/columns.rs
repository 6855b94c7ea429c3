use super::{StatColumn, StatKind};

const fn count(name: &'static str, header: &'static str) -> StatColumn {
    StatColumn { name, header, nth: 1, kind: StatKind::Count }
}

const fn decimal(name: &'static str, header: &'static str) -> StatColumn {
    StatColumn { name, header, nth: 1, kind: StatKind::Decimal }
}

impl StatColumn {
    /// Read from the second cell carrying this header label.
    const fn second(self) -> Self {
        Self { nth: 2, ..self }
    }
}

pub(super) const OVERALL: &[StatColumn] = &[
    count("rk", "rk"),
    count("mp", "mp"),
    count("w", "w"),
    count("d", "d"),
    count("l", "l"),
    count("gf", "gf"),
    count("ga", "ga"),
    count("gd", "gd"),
    count("pts", "pts"),
    decimal("pts_per_mp", "pts/mp"),
    decimal("xg", "xg"),
    decimal("xga", "xga"),
    decimal("xgd", "xgd"),
    decimal("xgd_per_90", "xgd/90"),
];

pub(super) const HOME_AWAY: &[StatColumn] = &[
    count("home_mp", "mp"),
    count("home_w", "w"),
    count("home_d", "d"),
    count("home_l", "l"),
    count("home_gf", "gf"),
    count("home_ga", "ga"),
    count("home_gd", "gd"),
    count("home_pts", "pts"),
    decimal("home_pts_per_mp", "pts/mp"),
    decimal("home_xg", "xg"),
    decimal("home_xga", "xga"),
    decimal("home_xgd", "xgd"),
    decimal("home_xgd_per_90", "xgd/90"),
    count("away_mp", "mp").second(),
    count("away_w", "w").second(),
    count("away_d", "d").second(),
    count("away_l", "l").second(),
    count("away_gf", "gf").second(),
    count("away_ga", "ga").second(),
    count("away_gd", "gd").second(),
    count("away_pts", "pts").second(),
    decimal("away_pts_per_mp", "pts/mp").second(),
    decimal("away_xg", "xg").second(),
    decimal("away_xga", "xga").second(),
    decimal("away_xgd", "xgd").second(),
    decimal("away_xgd_per_90", "xgd/90").second(),
];

pub(super) const SQUAD_STANDARD_FOR: &[StatColumn] = &[
    decimal("player_number", "# pl"),
    decimal("age", "age"),
    decimal("possession", "poss"),
    count("matches_played", "mp"),
    count("matches_started", "starts"),
    count("minutes_played", "min"),
    decimal("minutes_played_90s", "90s"),
    count("goals", "gls"),
    count("assists", "ast"),
    count("goals_and_assists", "g+a"),
    count("goals_minus_penalties", "g-pk"),
    count("penalties", "pk"),
    count("penalties_attempted", "pkatt"),
    count("yellow_cards", "crdy"),
    count("red_cards", "crdr"),
    decimal("expected_goals", "xg"),
    decimal("non_penalty_expected_goals", "npxg"),
    decimal("expected_assisted_goals", "xag"),
    decimal("npxg_plus_xag", "npxg+xag"),
    count("progressive_carries", "prgc"),
    count("progressive_passes", "prgp"),
    decimal("goals_per90", "gls").second(),
    decimal("assists_per90", "ast").second(),
    decimal("goals_and_assists_per90", "g+a").second(),
    decimal("goals_minus_penalties_per90", "g-pk").second(),
    decimal("goals_and_assists_minus_penalties_per90", "g+a-pk"),
    decimal("expected_goals_per90", "xg").second(),
    decimal("expected_assisted_goals_per90", "xag").second(),
    decimal("expected_goals_and_assists_per90", "xg+xag"),
    decimal("non_penalty_expected_goals_per90", "npxg").second(),
    decimal("npxg_plus_xag_per90", "npxg+xag").second(),
];

pub(super) const SQUAD_KEEPER_AGAINST: &[StatColumn] = &[
    decimal("player_number", "# pl"),
    count("matches_played", "mp"),
    count("matches_started", "starts"),
    count("minutes_played", "min"),
    decimal("minutes_played_90s", "90s"),
    count("goals_against", "ga"),
    decimal("goals_against_90s", "ga90"),
    count("shot_on_target_against", "sota"),
    count("saves", "saves"),
    decimal("save_percentage", "save%"),
    count("wins", "w"),
    count("draws", "d"),
    count("losses", "l"),
    count("clean_sheets", "cs"),
    decimal("clean_sheets_percentage", "cs%"),
    count("penalties_attempted", "pkatt"),
    count("penalties_allowed", "pka"),
    count("penalties_saved", "pksv"),
    count("penalties_missed", "pkm"),
    decimal("penalties_saved_percentage", "save%").second(),
];

pub(super) const SQUAD_KEEPER_ADV_FOR: &[StatColumn] = &[
    count("free_kick_goals_against", "fk"),
    count("corner_kick_goals_against", "ck"),
    count("own_goals_against", "og"),
    decimal("post_shot_xg", "psxg"),
    decimal("post_shot_xg_per_shot_ot", "psxg/sot"),
    decimal("post_shot_xg_minus_goals_allowed", "psxg+/-"),
    decimal("post_shot_xg_minus_goals_allowed_90s", "/90"),
    count("completed_long_balls", "cmp"),
    count("attempted_long_balls", "att"),
    decimal("long_balls_completed_percentage", "cmp%"),
    count("passes_attempted", "att (gk)"),
    count("throws_attempted", "thr"),
    decimal("launch_percentage", "launch%"),
    decimal("avg_pass_length", "avglen"),
    count("goal_kicks", "att").second(),
    decimal("goal_kicks_launched_percentage", "launch%").second(),
    decimal("goal_kicks_avg_length", "avglen").second(),
    count("crosses_faced", "opp"),
    count("crosses_stopped", "stp"),
    decimal("crosses_stopped_percentage", "stp%"),
    count("def_actions_outside_of_penalty_area", "#opa"),
    decimal("def_actions_outside_of_penalty_area_90s", "#opa/90"),
    decimal("avg_def_action_dist", "avgdist"),
];
