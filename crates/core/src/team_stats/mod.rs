//! Per-team season statistics tables, keyed by team, season and competition.

mod columns;
mod merge;
mod table;

pub use merge::*;
pub use table::*;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{CompetitionId, CoreError, TeamId};

static DECIMAL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(-?)(\d*)(?:\.(\d*))?$").unwrap());

static SEASON_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}(-\d{4})?$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamStatsId(pub i64);

impl From<i64> for TeamStatsId {
    fn from(v: i64) -> Self {
        Self(v)
    }
}

impl fmt::Display for TeamStatsId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One of the season tables scraped per competition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatTable {
    /// League table: points, goals, expected goals.
    Overall,
    /// League table split into home and away halves.
    HomeAway,
    /// Squad standard stats for the team.
    SquadStandardFor,
    /// Goalkeeping stats against the team.
    SquadKeeperAgainst,
    /// Advanced goalkeeping stats for the team.
    SquadKeeperAdvFor,
}

impl StatTable {
    pub const ALL: [Self; 5] = [
        Self::Overall,
        Self::HomeAway,
        Self::SquadStandardFor,
        Self::SquadKeeperAgainst,
        Self::SquadKeeperAdvFor,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::Overall => "overall",
            Self::HomeAway => "home_away",
            Self::SquadStandardFor => "squad_standard_for",
            Self::SquadKeeperAgainst => "squad_keeper_against",
            Self::SquadKeeperAdvFor => "squad_keeper_adv_for",
        }
    }

    /// Database table holding this kind of row.
    #[must_use]
    pub const fn table_name(&self) -> &'static str {
        match *self {
            Self::Overall => "team_overall_table_results",
            Self::HomeAway => "team_home_away_table_results",
            Self::SquadStandardFor => "team_squad_standard_for",
            Self::SquadKeeperAgainst => "team_squad_keeper_against",
            Self::SquadKeeperAdvFor => "team_squad_keeper_adv_for",
        }
    }

    /// Stat columns in storage order.
    #[must_use]
    pub const fn columns(&self) -> &'static [StatColumn] {
        match *self {
            Self::Overall => columns::OVERALL,
            Self::HomeAway => columns::HOME_AWAY,
            Self::SquadStandardFor => columns::SQUAD_STANDARD_FOR,
            Self::SquadKeeperAgainst => columns::SQUAD_KEEPER_AGAINST,
            Self::SquadKeeperAdvFor => columns::SQUAD_KEEPER_ADV_FOR,
        }
    }
}

impl fmt::Display for StatTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatTable {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        Self::ALL.into_iter().find(|t| t.as_str() == wanted).ok_or_else(|| {
            let known: Vec<&str> = Self::ALL.iter().map(StatTable::as_str).collect();
            CoreError::InvalidInput(format!(
                "unknown stat table {s:?}, expected one of: {}",
                known.join(", ")
            ))
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatKind {
    /// Whole number: matches, goals, cards.
    Count,
    /// Exact decimal: rates, percentages, expected goals.
    Decimal,
}

/// One stored stat and the scraped header it is read from.
///
/// `nth` picks among repeated header labels: the per-90 block of a squad
/// table reuses `Gls`, and the home/away table repeats every label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatColumn {
    pub name: &'static str,
    pub header: &'static str,
    pub nth: usize,
    pub kind: StatKind,
}

/// Decimal kept exactly as scraped, in canonical form: no sign on zero, no
/// leading zeros before the point, no trailing zeros after it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StatDecimal(String);

impl StatDecimal {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StatDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for StatDecimal {
    type Err = CoreError;

    /// Accepts `"1.50"`, `"+0.35"`, `"-.5"`, `"1,234.5"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cleaned = s.trim().trim_start_matches('+').replace(',', "");
        let invalid = || CoreError::InvalidInput(format!("invalid decimal value: {s:?}"));
        let caps = DECIMAL_REGEX.captures(&cleaned).ok_or_else(invalid)?;
        let whole = caps.get(2).map_or("", |m| m.as_str());
        let frac = caps.get(3).map_or("", |m| m.as_str());
        if whole.is_empty() && frac.is_empty() {
            return Err(invalid());
        }

        let whole = whole.trim_start_matches('0');
        let frac = frac.trim_end_matches('0');
        let magnitude = match (whole.is_empty(), frac.is_empty()) {
            (true, true) => return Ok(Self("0".to_owned())),
            (true, false) => format!("0.{frac}"),
            (false, true) => whole.to_owned(),
            (false, false) => format!("{whole}.{frac}"),
        };
        let negative = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
        Ok(Self(if negative { format!("-{magnitude}") } else { magnitude }))
    }
}

impl Serialize for StatDecimal {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum StatValue {
    Count(i64),
    Decimal(StatDecimal),
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count(n) => n.fmt(f),
            Self::Decimal(d) => d.fmt(f),
        }
    }
}

impl StatValue {
    /// Parse one cell for `column`. Blank cells are absent values.
    ///
    /// # Errors
    /// Returns `InvalidInput` when a non-blank cell does not fit the column.
    pub fn parse(column: &StatColumn, text: &str) -> Result<Option<Self>, CoreError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        match column.kind {
            StatKind::Count => text
                .trim_start_matches('+')
                .replace(',', "")
                .parse::<i64>()
                .map(|n| Some(Self::Count(n)))
                .map_err(|_| {
                    CoreError::InvalidInput(format!("{}: invalid count {text:?}", column.name))
                }),
            StatKind::Decimal => text
                .parse::<StatDecimal>()
                .map(|d| Some(Self::Decimal(d)))
                .map_err(|_| {
                    CoreError::InvalidInput(format!("{}: invalid decimal {text:?}", column.name))
                }),
        }
    }
}

/// Present stats by column name. Absent stats have no entry.
pub type StatValues = BTreeMap<&'static str, StatValue>;

/// Identity of one stats row: a table, a team, a season, a competition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TeamStatsKey {
    pub table: StatTable,
    pub team_id: TeamId,
    pub season: String,
    pub competition_id: CompetitionId,
}

impl fmt::Display for TeamStatsKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} team {} competition {}",
            self.table, self.season, self.team_id, self.competition_id
        )
    }
}

/// Incoming stats for one team, ready to merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamStatsRecord {
    pub key: TeamStatsKey,
    pub values: StatValues,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredTeamStats {
    pub id: TeamStatsId,
    pub key: TeamStatsKey,
    pub values: StatValues,
    pub first_seen_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validate a season label such as `2024-2025` or `2025`.
///
/// # Errors
/// Returns `InvalidInput` for anything else.
pub fn parse_season(text: &str) -> Result<String, CoreError> {
    let season = text.trim();
    if SEASON_REGEX.is_match(season) {
        Ok(season.to_owned())
    } else {
        Err(CoreError::InvalidInput(format!(
            "invalid season {text:?}, expected e.g. 2024-2025"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> String {
        s.parse::<StatDecimal>().unwrap().to_string()
    }

    #[test]
    fn decimals_are_canonical() {
        assert_eq!(dec("1.50"), "1.5");
        assert_eq!(dec("+0.35"), "0.35");
        assert_eq!(dec("-.5"), "-0.5");
        assert_eq!(dec("1,234.0"), "1234");
        assert_eq!(dec("-0.00"), "0");
        assert_eq!(dec("007"), "7");
    }

    #[test]
    fn bad_decimals_are_rejected() {
        for text in ["", ".", "-", "1.2.3", "abc", "12%"] {
            assert!(text.parse::<StatDecimal>().is_err(), "{text:?} should be rejected");
        }
    }

    #[test]
    fn counts_accept_sign_and_separators() {
        let gd = StatColumn { name: "gd", header: "gd", nth: 1, kind: StatKind::Count };
        assert_eq!(StatValue::parse(&gd, "+12").unwrap(), Some(StatValue::Count(12)));
        assert_eq!(StatValue::parse(&gd, "-3").unwrap(), Some(StatValue::Count(-3)));
        assert_eq!(StatValue::parse(&gd, "3,420").unwrap(), Some(StatValue::Count(3420)));
        assert_eq!(StatValue::parse(&gd, "  ").unwrap(), None);
        assert!(StatValue::parse(&gd, "1.5").is_err());
    }

    #[test]
    fn table_names_round_trip() {
        for table in StatTable::ALL {
            assert_eq!(table.as_str().parse::<StatTable>().unwrap(), table);
        }
        assert_eq!("home-away".parse::<StatTable>().unwrap(), StatTable::HomeAway);
        assert!("league".parse::<StatTable>().is_err());
    }

    #[test]
    fn every_table_has_unique_column_names() {
        for table in StatTable::ALL {
            let mut names: Vec<_> = table.columns().iter().map(|c| c.name).collect();
            names.sort_unstable();
            names.dedup();
            assert_eq!(names.len(), table.columns().len(), "{table}");
        }
    }

    #[test]
    fn seasons_are_validated() {
        assert_eq!(parse_season(" 2024-2025 ").unwrap(), "2024-2025");
        assert_eq!(parse_season("2025").unwrap(), "2025");
        assert!(parse_season("24/25").is_err());
        assert!(parse_season("").is_err());
    }
}
