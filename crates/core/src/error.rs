use thiserror::Error;

use crate::{NaturalKey, TeamStatsKey};

/// Errors raised by pure domain computations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A stored match and an incoming record were paired under one key but
    /// disagree on the identifying fields.
    #[error("key mismatch: stored match is {existing}, incoming record is {incoming}")]
    KeyMismatch { existing: NaturalKey, incoming: NaturalKey },

    /// Same pairing failure for a season stats row.
    #[error("key mismatch: stored stats are {existing}, incoming stats are {incoming}")]
    StatsKeyMismatch { existing: TeamStatsKey, incoming: TeamStatsKey },

    #[error("invalid input: {0}")]
    InvalidInput(String),
}
