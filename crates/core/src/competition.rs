use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompetitionId(pub i64);

impl From<i64> for CompetitionId {
    fn from(v: i64) -> Self {
        Self(v)
    }
}

impl fmt::Display for CompetitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Competition {
    pub id: CompetitionId,
    pub name: String,
    pub short_name: Option<String>,
    pub country: Option<String>,
    /// Competition number used by the fixtures source in its URLs.
    pub source_id: Option<i64>,
}

/// Seed row for the competitions table.
#[derive(Debug, Clone, Copy)]
pub struct CompetitionSeed {
    pub source_id: i64,
    pub name: &'static str,
    pub short_name: &'static str,
    pub country: &'static str,
}

pub const BUILTIN_COMPETITIONS: &[CompetitionSeed] = &[
    CompetitionSeed { source_id: 9, name: "Premier League", short_name: "EPL", country: "England" },
    CompetitionSeed { source_id: 12, name: "La Liga", short_name: "LaLiga", country: "Spain" },
    CompetitionSeed { source_id: 20, name: "Bundesliga", short_name: "BUN", country: "Germany" },
    CompetitionSeed { source_id: 11, name: "Serie A", short_name: "SerieA", country: "Italy" },
    CompetitionSeed { source_id: 13, name: "Ligue 1", short_name: "L1", country: "France" },
];
