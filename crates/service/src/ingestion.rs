//! Per-row ingestion of scraped match rows and team season tables.
//!
//! Every row is its own unit of work. Team names are resolved without
//! writing anything; only once they are settled does one transaction create
//! or update the teams, tag them and read-merge-write the record. A failing
//! row is recorded in the report, leaves nothing behind, and the run moves on.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use statlines_core::{
    CompetitionId, CoreError, FieldCorrection, MatchId, MergeKind, RawMatchRow, ScrapedCells,
    ScrapedStatTable, StatLayout, StatRow, StatTable, TeamStatsId, parse_season,
};
use statlines_storage::{MatchWrite, StatsWrite, Storage, StorageError};
use uuid::Uuid;

use crate::{ServiceError, TeamRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowErrorKind {
    ResolutionAmbiguous,
    KeyMismatch,
    TransactionFailure,
    InvalidInput,
}

impl RowErrorKind {
    pub(crate) fn classify(err: &ServiceError) -> Self {
        match err {
            ServiceError::ResolutionAmbiguous { .. } => Self::ResolutionAmbiguous,
            ServiceError::InvalidInput(_) => Self::InvalidInput,
            ServiceError::Storage(StorageError::Merge(
                CoreError::KeyMismatch { .. } | CoreError::StatsKeyMismatch { .. },
            )) => Self::KeyMismatch,
            ServiceError::Storage(StorageError::Merge(CoreError::InvalidInput(_))) => {
                Self::InvalidInput
            },
            ServiceError::Storage(_) => Self::TransactionFailure,
        }
    }
}

/// A skipped row. `row` is the 1-based position in the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowFailure {
    pub row: usize,
    pub kind: RowErrorKind,
    pub message: String,
}

/// The stored record a row was merged into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordId {
    Match(MatchId),
    TeamStats(TeamStatsId),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Match(id) => write!(f, "match {id}"),
            Self::TeamStats(id) => write!(f, "team stats {id}"),
        }
    }
}

/// What one successful row did to storage.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RowWrite {
    record: RecordId,
    kind: MergeKind,
    corrections: Vec<FieldCorrection>,
}

impl From<MatchWrite> for RowWrite {
    fn from(w: MatchWrite) -> Self {
        Self { record: RecordId::Match(w.id), kind: w.kind, corrections: w.corrections }
    }
}

impl From<StatsWrite> for RowWrite {
    fn from(w: StatsWrite) -> Self {
        Self { record: RecordId::TeamStats(w.id), kind: w.kind, corrections: w.corrections }
    }
}

/// A stored value replaced by a different one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CorrectionNotice {
    pub row: usize,
    pub record: RecordId,
    pub field: &'static str,
    pub previous: String,
    pub current: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestionReport {
    pub run_id: Uuid,
    pub processed: usize,
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    /// Always `errors.len()`.
    pub skipped: usize,
    pub errors: Vec<RowFailure>,
    pub corrections: Vec<CorrectionNotice>,
}

impl IngestionReport {
    fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            processed: 0,
            created: 0,
            updated: 0,
            unchanged: 0,
            skipped: 0,
            errors: Vec::new(),
            corrections: Vec::new(),
        }
    }

    fn record_write(&mut self, row: usize, write: RowWrite) {
        match write.kind {
            MergeKind::Created => self.created += 1,
            MergeKind::Updated => self.updated += 1,
            MergeKind::Unchanged => self.unchanged += 1,
        }
        self.corrections.extend(write.corrections.into_iter().map(|c| CorrectionNotice {
            row,
            record: write.record,
            field: c.field,
            previous: c.previous,
            current: c.current,
        }));
    }

    fn record_failure(&mut self, row: usize, err: &ServiceError) {
        self.skipped += 1;
        self.errors.push(RowFailure {
            row,
            kind: RowErrorKind::classify(err),
            message: err.to_string(),
        });
    }
}

pub struct IngestionPipeline {
    registry: Arc<TeamRegistry>,
    storage: Storage,
    competition: Option<CompetitionId>,
}

impl IngestionPipeline {
    #[must_use]
    pub const fn new(registry: Arc<TeamRegistry>, storage: Storage) -> Self {
        Self { registry, storage, competition: None }
    }

    /// Tag every ingested match (and any untagged team) with `competition`.
    #[must_use]
    pub fn with_competition(mut self, competition: CompetitionId) -> Self {
        self.competition = Some(competition);
        self
    }

    /// Ingest rows in order. Never fails as a whole: each row's outcome is
    /// counted or recorded in the report.
    pub fn ingest(&self, rows: &[RawMatchRow]) -> IngestionReport {
        self.run(rows.iter().map(Ok), |raw| self.ingest_row(raw).map(RowWrite::from))
    }

    /// Ingest scraped text cells. A row whose cells cannot be parsed is
    /// recorded as an `InvalidInput` failure like any other bad row.
    pub fn ingest_cells(&self, cells: Vec<ScrapedCells>, season_year: i32) -> IngestionReport {
        let rows: Vec<Result<RawMatchRow, CoreError>> =
            cells.into_iter().map(|c| c.into_raw_row(season_year)).collect();
        self.run(rows.iter().map(|r| r.as_ref().map_err(CoreError::clone)), |raw| {
            self.ingest_row(raw).map(RowWrite::from)
        })
    }

    /// Ingest one scraped season table for the configured competition.
    ///
    /// Fails as a whole only when the table cannot be read at all: no
    /// competition configured, a malformed season or a header without a
    /// `Squad` column. Row failures are recorded in the report.
    pub fn ingest_stat_table(
        &self,
        table: StatTable,
        season: &str,
        scraped: &ScrapedStatTable,
    ) -> Result<IngestionReport, ServiceError> {
        let competition = self.competition.ok_or_else(|| {
            ServiceError::InvalidInput(format!("{table} rows need a competition"))
        })?;
        let season = parse_season(season).map_err(|e| ServiceError::InvalidInput(e.to_string()))?;
        let layout = StatLayout::new(table, &scraped.header)
            .map_err(|e| ServiceError::InvalidInput(e.to_string()))?;

        let missing: Vec<&str> = layout.missing().collect();
        if !missing.is_empty() {
            tracing::warn!(%table, missing = ?missing, "Header lacks some stat columns");
        }

        let rows: Vec<Result<StatRow, CoreError>> =
            scraped.rows.iter().map(|cells| layout.parse_row(cells)).collect();
        Ok(self.run(rows.iter().map(|r| r.as_ref().map_err(CoreError::clone)), |row| {
            self.ingest_stat_row(table, competition, &season, row).map(RowWrite::from)
        }))
    }

    fn run<'a, T, I, F>(&self, rows: I, apply: F) -> IngestionReport
    where
        T: 'a,
        I: ExactSizeIterator<Item = Result<&'a T, CoreError>>,
        F: Fn(&'a T) -> Result<RowWrite, ServiceError>,
    {
        let mut report = IngestionReport::new();
        tracing::info!(run_id = %report.run_id, rows = rows.len(), "Ingestion run started");

        for (idx, raw) in rows.enumerate() {
            let row = idx + 1;
            report.processed += 1;
            let outcome = raw.map_err(|e| ServiceError::InvalidInput(e.to_string())).and_then(&apply);
            match outcome {
                Ok(write) => {
                    tracing::debug!(row, record = %write.record, kind = ?write.kind, "Row merged");
                    for c in &write.corrections {
                        tracing::warn!(
                            row,
                            record = %write.record,
                            field = c.field,
                            previous = %c.previous,
                            current = %c.current,
                            "Stored value corrected"
                        );
                    }
                    report.record_write(row, write);
                },
                Err(e) => {
                    tracing::warn!(row, error = %e, "Row skipped");
                    report.record_failure(row, &e);
                },
            }
        }

        tracing::info!(
            run_id = %report.run_id,
            processed = report.processed,
            created = report.created,
            updated = report.updated,
            unchanged = report.unchanged,
            skipped = report.skipped,
            corrections = report.corrections.len(),
            "Ingestion run finished"
        );
        report
    }

    fn ingest_row(&self, raw: &RawMatchRow) -> Result<MatchWrite, ServiceError> {
        let home = self.registry.plan(&raw.home_team)?;
        let away = self.registry.plan(&raw.away_team)?;
        if home.same_team(&away) {
            return Err(ServiceError::InvalidInput(format!(
                "home and away both resolve to the same team ({:?} vs {:?})",
                raw.home_team, raw.away_team
            )));
        }

        let write = self.storage.apply_match_row(raw, &home, &away, self.competition)?;
        self.registry.remember_name(&raw.home_team, write.key.home_team_id);
        self.registry.remember_name(&raw.away_team, write.key.away_team_id);
        Ok(write)
    }

    fn ingest_stat_row(
        &self,
        table: StatTable,
        competition: CompetitionId,
        season: &str,
        row: &StatRow,
    ) -> Result<StatsWrite, ServiceError> {
        let team = self.registry.plan(&row.squad)?;
        let write =
            self.storage.apply_team_stats_row(table, &team, competition, season, &row.values)?;
        self.registry.remember_name(&row.squad, write.key.team_id);
        Ok(write)
    }
}
