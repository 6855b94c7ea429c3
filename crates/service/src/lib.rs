//! Service layer for statlines
//!
//! Turns raw fixture rows and season tables into stored teams, matches
//! and team stats.

#![allow(clippy::missing_errors_doc, reason = "Errors are self-explanatory from Result types")]
#![allow(clippy::module_name_repetitions, reason = "Type names read better in full")]

mod error;
mod ingestion;
mod team_registry;
#[cfg(test)]
mod tests;

pub use error::ServiceError;
pub use ingestion::{
    CorrectionNotice, IngestionPipeline, IngestionReport, RecordId, RowErrorKind, RowFailure,
};
pub use team_registry::TeamRegistry;
