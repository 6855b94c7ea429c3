//! Core types for statlines
//!
//! Domain types, name rules and merge computation shared by storage,
//! service and CLI crates. Nothing in here touches the database.

mod competition;
pub mod constants;
mod env_config;
mod error;
mod field_merge;
mod match_record;
mod team;
mod team_stats;

pub use competition::*;
pub use env_config::*;
pub use error::*;
pub use match_record::*;
pub use team::*;
pub use team_stats::*;
