//! Text cells from a fixtures table and their conversion into [`RawMatchRow`].

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveTime};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{ExpectedGoals, RawMatchRow};
use crate::CoreError;

static SCORE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+)\s*[-\u{2013}\u{2014}]\s*(\d+)\s*$").unwrap());

/// One scraped table row, every cell as extracted text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapedCells {
    #[serde(default)]
    pub gameweek: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub home_team: Option<String>,
    #[serde(default)]
    pub away_team: Option<String>,
    #[serde(default)]
    pub score: Option<String>,
    #[serde(default)]
    pub home_xg: Option<String>,
    #[serde(default)]
    pub away_xg: Option<String>,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub attendance: Option<String>,
    #[serde(default)]
    pub referee: Option<String>,
    #[serde(default)]
    pub match_report: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl ScrapedCells {
    /// Parse the cells; `season_year` completes dates printed without a year.
    ///
    /// # Errors
    /// Returns `InvalidInput` when the date or either team name is missing or unparsable.
    pub fn into_raw_row(self, season_year: i32) -> Result<RawMatchRow, CoreError> {
        let date_text = cell(self.date.as_deref())
            .ok_or_else(|| CoreError::InvalidInput("missing match date".to_owned()))?;
        let match_date = parse_date(date_text, season_year)?;
        let home_team = cell(self.home_team.as_deref())
            .ok_or_else(|| CoreError::InvalidInput("missing home team".to_owned()))?
            .to_owned();
        let away_team = cell(self.away_team.as_deref())
            .ok_or_else(|| CoreError::InvalidInput("missing away team".to_owned()))?
            .to_owned();
        let (home_score, away_score) = parse_score(self.score.as_deref()).unzip();

        Ok(RawMatchRow {
            week_number: cell(self.gameweek.as_deref()).and_then(|w| w.parse().ok()),
            match_date,
            match_time: parse_time(self.start_time.as_deref()),
            home_team,
            away_team,
            home_score,
            away_score,
            home_xg: cell(self.home_xg.as_deref()).and_then(|x| x.parse().ok()),
            away_xg: cell(self.away_xg.as_deref()).and_then(|x| x.parse::<ExpectedGoals>().ok()),
            venue: cell(self.venue.as_deref()).map(str::to_owned),
            attendance: parse_attendance(self.attendance.as_deref()),
            referee: cell(self.referee.as_deref()).map(str::to_owned),
            report_ref: cell(self.match_report.as_deref()).map(str::to_owned),
            notes: cell(self.notes.as_deref()).map(str::to_owned),
        })
    }
}

fn cell(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

/// `2024-08-16`, or `Fri, Aug 16` placed in `season_year`.
///
/// # Errors
/// Returns `InvalidInput` for any other shape.
pub fn parse_date(text: &str, season_year: i32) -> Result<NaiveDate, CoreError> {
    let text = text.trim();
    if text.contains('-') {
        return NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .map_err(|e| CoreError::InvalidInput(format!("invalid match date {text:?}: {e}")));
    }
    NaiveDate::parse_from_str(&format!("{text}, {season_year}"), "%a, %b %d, %Y")
        .map_err(|e| CoreError::InvalidInput(format!("invalid match date {text:?}: {e}")))
}

/// `15:00` → 15:00; anything else is treated as unknown.
#[must_use]
pub fn parse_time(text: Option<&str>) -> Option<NaiveTime> {
    cell(text).and_then(|t| NaiveTime::parse_from_str(t, "%H:%M").ok())
}

/// `2–1`, `2—1` or `2-1` → `(2, 1)`.
#[must_use]
pub fn parse_score(text: Option<&str>) -> Option<(u32, u32)> {
    let caps = SCORE_REGEX.captures(cell(text)?)?;
    let home = caps.get(1)?.as_str().parse().ok()?;
    let away = caps.get(2)?.as_str().parse().ok()?;
    Some((home, away))
}

/// `60,123` → 60123.
#[must_use]
pub fn parse_attendance(text: Option<&str>) -> Option<u32> {
    cell(text).and_then(|t| t.replace(',', "").trim().parse().ok())
}
