//! Match facts as they arrive from sources and as they are stored.

mod cells;
mod merge;

pub use cells::*;
pub use merge::*;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CompetitionId, CoreError, TeamId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchId(pub i64);

impl From<i64> for MatchId {
    fn from(v: i64) -> Self {
        Self(v)
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Expected-goals value with two fixed decimal places, held as hundredths.
///
/// Accepts `"1.35"`, `"0.4"`, `"2"` or a JSON number. More than two
/// fractional digits is rejected rather than rounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "XgRepr")]
pub struct ExpectedGoals(u32);

impl ExpectedGoals {
    #[must_use]
    pub const fn from_hundredths(hundredths: u32) -> Self {
        Self(hundredths)
    }

    #[must_use]
    pub const fn hundredths(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ExpectedGoals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl FromStr for ExpectedGoals {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::InvalidInput(format!("invalid expected goals value: {s:?}"));
        let s = s.trim();
        let (whole, frac) = s.split_once('.').unwrap_or((s, ""));
        if whole.is_empty()
            || frac.len() > 2
            || !whole.chars().all(|c| c.is_ascii_digit())
            || !frac.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }
        let whole: u32 = whole.parse().map_err(|_| invalid())?;
        let frac: u32 = match frac.len() {
            0 => 0,
            1 => frac.parse::<u32>().map_err(|_| invalid())? * 10,
            _ => frac.parse().map_err(|_| invalid())?,
        };
        whole.checked_mul(100).and_then(|w| w.checked_add(frac)).map(Self).ok_or_else(invalid)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum XgRepr {
    Text(String),
    Number(f64),
}

impl TryFrom<XgRepr> for ExpectedGoals {
    type Error = CoreError;

    fn try_from(value: XgRepr) -> Result<Self, Self::Error> {
        match value {
            XgRepr::Text(s) => s.parse(),
            XgRepr::Number(n) => format!("{n:.2}").parse(),
        }
    }
}

impl Serialize for ExpectedGoals {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Identity of a match independent of its generated id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NaturalKey {
    pub match_date: NaiveDate,
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
}

impl fmt::Display for NaturalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} team {} vs team {}", self.match_date, self.home_team_id, self.away_team_id)
    }
}

/// One source row, after HTML extraction and before team resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMatchRow {
    #[serde(default)]
    pub week_number: Option<u32>,
    pub match_date: NaiveDate,
    #[serde(default)]
    pub match_time: Option<NaiveTime>,
    pub home_team: String,
    pub away_team: String,
    #[serde(default)]
    pub home_score: Option<u32>,
    #[serde(default)]
    pub away_score: Option<u32>,
    #[serde(default)]
    pub home_xg: Option<ExpectedGoals>,
    #[serde(default)]
    pub away_xg: Option<ExpectedGoals>,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub attendance: Option<u32>,
    #[serde(default)]
    pub referee: Option<String>,
    #[serde(default)]
    pub report_ref: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl RawMatchRow {
    /// Minimal fixture row; everything besides the key is unknown.
    #[must_use]
    pub fn fixture(match_date: NaiveDate, home_team: &str, away_team: &str) -> Self {
        Self {
            week_number: None,
            match_date,
            match_time: None,
            home_team: home_team.to_owned(),
            away_team: away_team.to_owned(),
            home_score: None,
            away_score: None,
            home_xg: None,
            away_xg: None,
            venue: None,
            attendance: None,
            referee: None,
            report_ref: None,
            notes: None,
        }
    }
}

/// Every non-identifying match field. `None` means "not known by this source row".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchFields {
    pub week_number: Option<u32>,
    pub match_time: Option<NaiveTime>,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    pub home_xg: Option<ExpectedGoals>,
    pub away_xg: Option<ExpectedGoals>,
    pub venue: Option<String>,
    pub attendance: Option<u32>,
    pub referee: Option<String>,
    pub report_ref: Option<String>,
    pub notes: Option<String>,
    pub competition_id: Option<CompetitionId>,
}

impl MatchFields {
    /// Blank text is treated as absent so it can never overwrite stored text.
    #[must_use]
    pub fn from_raw(row: &RawMatchRow, competition_id: Option<CompetitionId>) -> Self {
        Self {
            week_number: row.week_number,
            match_time: row.match_time,
            home_score: row.home_score,
            away_score: row.away_score,
            home_xg: row.home_xg,
            away_xg: row.away_xg,
            venue: non_blank(row.venue.as_deref()),
            attendance: row.attendance,
            referee: non_blank(row.referee.as_deref()),
            report_ref: non_blank(row.report_ref.as_deref()),
            notes: non_blank(row.notes.as_deref()),
            competition_id,
        }
    }
}

fn non_blank(s: Option<&str>) -> Option<String> {
    s.map(str::trim).filter(|s| !s.is_empty()).map(str::to_owned)
}

/// An incoming match with its teams already resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub key: NaturalKey,
    pub fields: MatchFields,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMatch {
    pub id: MatchId,
    pub key: NaturalKey,
    pub fields: MatchFields,
    pub first_seen_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xg_parses_fixed_precision() {
        assert_eq!("1.35".parse::<ExpectedGoals>().unwrap().hundredths(), 135);
        assert_eq!("0.4".parse::<ExpectedGoals>().unwrap().hundredths(), 40);
        assert_eq!("2".parse::<ExpectedGoals>().unwrap().hundredths(), 200);
        assert_eq!(ExpectedGoals::from_hundredths(7).to_string(), "0.07");
    }

    #[test]
    fn xg_rejects_excess_precision_and_garbage() {
        assert!("1.355".parse::<ExpectedGoals>().is_err());
        assert!("".parse::<ExpectedGoals>().is_err());
        assert!("-1.0".parse::<ExpectedGoals>().is_err());
        assert!(".5".parse::<ExpectedGoals>().is_err());
    }

    #[test]
    fn raw_row_deserializes_with_missing_optionals() {
        let row: RawMatchRow = serde_json::from_str(
            r#"{"match_date":"2025-01-01","home_team":"Arsenal","away_team":"Chelsea",
                "venue":"Emirates Stadium","home_xg":1.2,"away_xg":"0.85"}"#,
        )
        .unwrap();
        assert_eq!(row.venue.as_deref(), Some("Emirates Stadium"));
        assert_eq!(row.home_score, None);
        assert_eq!(row.home_xg.map(ExpectedGoals::hundredths), Some(120));
        assert_eq!(row.away_xg.map(ExpectedGoals::hundredths), Some(85));
    }

    #[test]
    fn fields_from_raw_drops_blank_text() {
        let mut row = RawMatchRow::fixture(
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            "Arsenal",
            "Chelsea",
        );
        row.referee = Some("   ".to_owned());
        row.venue = Some(" Emirates Stadium ".to_owned());
        let fields = MatchFields::from_raw(&row, None);
        assert_eq!(fields.referee, None);
        assert_eq!(fields.venue.as_deref(), Some("Emirates Stadium"));
    }
}
