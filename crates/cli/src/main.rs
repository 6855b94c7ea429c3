use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use statlines_core::{StatTable, db_path_from_env};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "statlines")]
#[command(about = "Football match ingestion with an exactly-once schema ledger", long_about = None)]
struct Cli {
    /// Database file; overrides STATLINES_DB_PATH
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect or apply schema migrations
    #[command(subcommand)]
    Migrate(MigrateCommand),
    /// Ingest a JSON array of match rows
    Ingest {
        file: PathBuf,
        /// Input is scraped text cells instead of typed rows
        #[arg(long)]
        cells: bool,
        /// Year completing cell dates printed without one
        #[arg(long, requires = "cells")]
        season_year: Option<i32>,
        /// Competition short name to tag matches with (EPL, LaLiga, ...)
        #[arg(short, long)]
        competition: Option<String>,
    },
    /// Ingest one scraped season table ({"header": [...], "rows": [[...], ...]})
    IngestStats {
        file: PathBuf,
        /// overall, home_away, squad_standard_for, squad_keeper_against, squad_keeper_adv_for
        #[arg(long)]
        table: StatTable,
        /// Season label, e.g. 2024-2025
        #[arg(long)]
        season: String,
        /// Competition short name the table belongs to
        #[arg(short, long)]
        competition: String,
    },
    /// Resolve a team name to its id, creating the team if unknown
    Resolve { name: String },
    /// Show a stored match by date and team names
    Match { date: NaiveDate, home: String, away: String },
    /// Show a team's stored seasons of one stats table
    Stats {
        team: String,
        #[arg(long)]
        table: StatTable,
    },
    /// List stored teams
    Teams,
}

#[derive(Subcommand)]
enum MigrateCommand {
    /// Show every migration and whether it is applied
    Status,
    /// Apply all pending migrations in order
    Run,
    /// Apply one migration by id
    RunOne {
        #[arg(long)]
        id: u32,
    },
}

pub(crate) fn ensure_db_dir(db_path: &Path) -> Result<()> {
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let db_path = cli.db.unwrap_or_else(db_path_from_env);
    ensure_db_dir(&db_path)?;
    tracing::debug!(db = %db_path.display(), "Using database");

    match cli.command {
        Commands::Migrate(MigrateCommand::Status) => commands::migrate::run_status(&db_path),
        Commands::Migrate(MigrateCommand::Run) => commands::migrate::run_pending(&db_path),
        Commands::Migrate(MigrateCommand::RunOne { id }) => {
            commands::migrate::run_one(&db_path, id)
        },
        Commands::Ingest { file, cells, season_year, competition } => {
            commands::ingest::run(&db_path, &file, cells, season_year, competition.as_deref())
        },
        Commands::IngestStats { file, table, season, competition } => {
            commands::ingest::run_stats(&db_path, &file, table, &season, &competition)
        },
        Commands::Resolve { name } => commands::query::run_resolve(&db_path, &name),
        Commands::Match { date, home, away } => {
            commands::query::run_match(&db_path, date, &home, &away)
        },
        Commands::Stats { team, table } => commands::query::run_stats(&db_path, &team, table),
        Commands::Teams => commands::query::run_teams(&db_path),
    }
}
