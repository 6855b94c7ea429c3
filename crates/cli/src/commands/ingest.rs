use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use statlines_core::{RawMatchRow, ScrapedCells, ScrapedStatTable, StatTable};
use statlines_service::{IngestionPipeline, TeamRegistry};
use statlines_storage::Storage;

use crate::print_json;

pub(crate) fn run(
    db_path: &Path,
    file: &Path,
    cells: bool,
    season_year: Option<i32>,
    competition: Option<&str>,
) -> Result<()> {
    let input = std::fs::read_to_string(file)
        .with_context(|| format!("reading {}", file.display()))?;

    let storage = Storage::new(db_path)?;
    let registry = Arc::new(TeamRegistry::new(storage.clone()));
    let mut pipeline = IngestionPipeline::new(registry, storage.clone());
    if let Some(short_name) = competition {
        let found = storage
            .get_competition_by_short_name(short_name)?
            .with_context(|| format!("unknown competition '{short_name}'"))?;
        pipeline = pipeline.with_competition(found.id);
    }

    let report = if cells {
        let season_year = season_year.context("--season-year is required with --cells")?;
        let rows: Vec<ScrapedCells> = serde_json::from_str(&input)
            .with_context(|| format!("parsing scraped cells from {}", file.display()))?;
        pipeline.ingest_cells(rows, season_year)
    } else {
        let rows: Vec<RawMatchRow> = serde_json::from_str(&input)
            .with_context(|| format!("parsing match rows from {}", file.display()))?;
        pipeline.ingest(&rows)
    };

    print_json(&report)
}

pub(crate) fn run_stats(
    db_path: &Path,
    file: &Path,
    table: StatTable,
    season: &str,
    competition: &str,
) -> Result<()> {
    let input = std::fs::read_to_string(file)
        .with_context(|| format!("reading {}", file.display()))?;
    let scraped: ScrapedStatTable = serde_json::from_str(&input)
        .with_context(|| format!("parsing {table} table from {}", file.display()))?;

    let storage = Storage::new(db_path)?;
    let found = storage
        .get_competition_by_short_name(competition)?
        .with_context(|| format!("unknown competition '{competition}'"))?;
    let registry = Arc::new(TeamRegistry::new(storage.clone()));
    let pipeline = IngestionPipeline::new(registry, storage).with_competition(found.id);

    let report = pipeline.ingest_stat_table(table, season, &scraped)?;
    print_json(&report)
}
