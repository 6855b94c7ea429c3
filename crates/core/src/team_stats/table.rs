//! Scraped season tables: a header row and one row of cells per squad.

use serde::{Deserialize, Serialize};

use super::{StatColumn, StatTable, StatValue, StatValues};
use crate::CoreError;

const SQUAD_HEADER: &str = "squad";
/// Opponent tables label each row `vs Arsenal`.
const OPPONENT_PREFIX: &str = "vs ";

/// One season table as scraped: header labels and raw cell text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapedStatTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Squad name and parsed stats of one table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatRow {
    pub squad: String,
    pub values: StatValues,
}

/// Cell positions of the squad name and of every stored stat.
#[derive(Debug, Clone)]
pub struct StatLayout {
    width: usize,
    squad: usize,
    columns: Vec<(&'static StatColumn, Option<usize>)>,
}

impl StatLayout {
    /// Locate each column of `table` in `header`. Labels compare
    /// case-insensitively; a stat whose label is missing stays absent.
    ///
    /// # Errors
    /// Returns `InvalidInput` when the header has no `Squad` label.
    pub fn new(table: StatTable, header: &[String]) -> Result<Self, CoreError> {
        let labels: Vec<String> = header.iter().map(|h| h.trim().to_lowercase()).collect();
        let position = |label: &str, nth: usize| {
            labels
                .iter()
                .enumerate()
                .filter(|(_, l)| l.as_str() == label)
                .nth(nth.saturating_sub(1))
                .map(|(i, _)| i)
        };

        let squad = position(SQUAD_HEADER, 1).ok_or_else(|| {
            CoreError::InvalidInput(format!("{table} header has no Squad column: {header:?}"))
        })?;
        let columns = table.columns().iter().map(|c| (c, position(c.header, c.nth))).collect();

        Ok(Self { width: labels.len(), squad, columns })
    }

    /// Stats whose header label was not found.
    pub fn missing(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().filter(|(_, at)| at.is_none()).map(|(c, _)| c.name)
    }

    /// # Errors
    /// Returns `InvalidInput` for a row shorter than the header, a blank
    /// squad name or a cell that does not parse for its column.
    pub fn parse_row(&self, cells: &[String]) -> Result<StatRow, CoreError> {
        if cells.len() < self.width {
            return Err(CoreError::InvalidInput(format!(
                "row has {} cells, header has {}",
                cells.len(),
                self.width
            )));
        }

        let raw_squad = cells[self.squad].trim();
        let squad = raw_squad.strip_prefix(OPPONENT_PREFIX).unwrap_or(raw_squad).trim();
        if squad.is_empty() {
            return Err(CoreError::InvalidInput("row has no squad name".to_owned()));
        }

        let mut values = StatValues::new();
        for (column, at) in &self.columns {
            let Some(at) = *at else { continue };
            if let Some(value) = StatValue::parse(column, &cells[at])? {
                values.insert(column.name, value);
            }
        }
        Ok(StatRow { squad: squad.to_owned(), values })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StatDecimal;

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| (*c).to_owned()).collect()
    }

    fn dec(s: &str) -> StatValue {
        StatValue::Decimal(s.parse::<StatDecimal>().unwrap())
    }

    #[test]
    fn overall_row_parses_by_header_label() {
        let header = strings(&[
            "Rk", "Squad", "MP", "W", "D", "L", "GF", "GA", "GD", "Pts", "Pts/MP", "xG", "xGA",
            "xGD", "xGD/90", "Top Team Scorer",
        ]);
        let layout = StatLayout::new(StatTable::Overall, &header).unwrap();
        assert_eq!(layout.missing().count(), 0);

        let row = layout
            .parse_row(&strings(&[
                "1", "Liverpool", "38", "25", "9", "4", "86", "41", "+45", "84", "2.21", "82.2",
                "38.3", "+43.9", "+1.16", "Mohamed Salah - 29",
            ]))
            .unwrap();
        assert_eq!(row.squad, "Liverpool");
        assert_eq!(row.values["gd"], StatValue::Count(45));
        assert_eq!(row.values["xgd"], dec("43.9"));
        assert_eq!(row.values["pts_per_mp"], dec("2.21"));
        assert_eq!(row.values.len(), StatTable::Overall.columns().len());
    }

    #[test]
    fn repeated_labels_pick_the_nth_occurrence() {
        let header = strings(&["Squad", "MP", "Pts", "MP", "Pts"]);
        let layout = StatLayout::new(StatTable::HomeAway, &header).unwrap();
        let row = layout.parse_row(&strings(&["Arsenal", "19", "44", "19", "30"])).unwrap();
        assert_eq!(row.values["home_pts"], StatValue::Count(44));
        assert_eq!(row.values["away_pts"], StatValue::Count(30));
        assert!(!row.values.contains_key("home_xg"));
        assert!(layout.missing().any(|name| name == "away_xgd_per_90"));
    }

    #[test]
    fn opponent_prefix_is_stripped_from_squad() {
        let header = strings(&["Squad", "# Pl", "Gls"]);
        let layout = StatLayout::new(StatTable::SquadStandardFor, &header).unwrap();
        let row = layout.parse_row(&strings(&["vs Brentford", "27", "48"])).unwrap();
        assert_eq!(row.squad, "Brentford");
        assert_eq!(row.values["player_number"], dec("27"));
        assert_eq!(row.values["goals"], StatValue::Count(48));
    }

    #[test]
    fn blank_cells_are_absent() {
        let header = strings(&["Squad", "xG", "Pts"]);
        let layout = StatLayout::new(StatTable::Overall, &header).unwrap();
        let row = layout.parse_row(&strings(&["Everton", "", "48"])).unwrap();
        assert!(!row.values.contains_key("xg"));
        assert_eq!(row.values["pts"], StatValue::Count(48));
    }

    #[test]
    fn short_row_is_rejected() {
        let header = strings(&["Squad", "MP", "W"]);
        let layout = StatLayout::new(StatTable::Overall, &header).unwrap();
        let err = layout.parse_row(&strings(&["Fulham", "38"])).unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(msg) if msg.contains("2 cells")));
    }

    #[test]
    fn unparsable_cell_is_rejected() {
        let header = strings(&["Squad", "MP"]);
        let layout = StatLayout::new(StatTable::Overall, &header).unwrap();
        assert!(layout.parse_row(&strings(&["Fulham", "thirty"])).is_err());
    }

    #[test]
    fn header_without_squad_is_rejected() {
        let header = strings(&["Rk", "Team", "MP"]);
        assert!(StatLayout::new(StatTable::Overall, &header).is_err());
    }
}
