//! # gamestat
//!
//! Command-line entry point: opens the store described by the settings,
//! runs startup patches, and prints JSON reports to stdout. Logs go to
//! stderr.

#![deny(unsafe_code)]

mod report;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use gamestat_aggregate::{player_container, server_container};
use gamestat_core::logging;
use gamestat_settings::{DatabaseKind, Settings};
use gamestat_store::Database;
use gamestat_store::transactions::{DAY_MS, RemoveOldSampledData};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::report::{PlayerReport, ServerReport};

/// Game-server statistics store.
#[derive(Parser, Debug)]
#[command(name = "gamestat", about = "Game-server statistics store")]
struct Cli {
    /// Settings file (defaults to `~/.gamestat/settings.json`).
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Database file, overriding `database.sqlitePath`.
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create missing tables, apply pending patches and print their status.
    Migrate,
    /// Print which patches are applied without changing anything.
    Patches,
    /// Print the report for one player.
    Player {
        /// Player uuid.
        uuid: Uuid,
    },
    /// Print the report for one server.
    Server {
        /// Server uuid.
        uuid: Uuid,
    },
    /// Remove TPS and ping samples older than their retention windows.
    Cleanup,
}

fn load_settings(cli: &Cli) -> Result<Settings> {
    let path = cli
        .settings
        .clone()
        .unwrap_or_else(gamestat_settings::settings_path);
    let mut settings = gamestat_settings::load_settings_from_path(&path)
        .with_context(|| format!("Failed to load settings from {}", path.display()))?;
    if let Some(db_path) = &cli.db_path {
        settings.database.sqlite_path = db_path.to_string_lossy().into_owned();
    }
    settings.validate().context("Invalid settings")?;
    Ok(settings)
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    Ok(())
}

fn open_database(settings: &Settings) -> Result<Database> {
    if settings.database.kind == DatabaseKind::Sqlite {
        ensure_parent_dir(Path::new(&settings.database.sqlite_path))?;
    }
    Database::open(&settings.database).context("Failed to open database")
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = load_settings(&cli)?;
    logging::init(
        &settings.logging.level,
        logging::LogFormat::from_json_flag(settings.logging.json),
    );

    let db = open_database(&settings)?;
    if let Command::Patches = cli.command {
        return print_json(&db.patch_status().context("Failed to read patch status")?);
    }
    db.init().context("Database startup failed")?;

    match cli.command {
        Command::Migrate => print_json(&json!({
            "state": db.state(),
            "patches": db.patch_status().context("Failed to read patch status")?,
        })),
        Command::Patches => Ok(()),
        Command::Player { uuid } => {
            let container = player_container(&db, uuid);
            let report = PlayerReport::read(&container)
                .with_context(|| format!("Failed to build report for player {uuid}"))?;
            print_json(&report)
        }
        Command::Server { uuid } => {
            let now = chrono::Utc::now().timestamp_millis();
            let since = now - i64::from(settings.analysis.tps_window_days) * DAY_MS;
            let container =
                server_container(&db, uuid, since, settings.analysis.low_tps_threshold);
            let report = ServerReport::read(&container)
                .with_context(|| format!("Failed to build report for server {uuid}"))?;
            print_json(&report)
        }
        Command::Cleanup => {
            let now = chrono::Utc::now().timestamp_millis();
            let mut sweep = RemoveOldSampledData::from_retention(&settings.retention, now);
            if !db.execute(&mut sweep)? {
                bail!("Cleanup was skipped; see the log and run it again");
            }
            info!(
                tps_before = sweep.tps_before(),
                ping_before = sweep.ping_before(),
                "cleanup done"
            );
            print_json(&json!({ "removed": sweep.removed() }))
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
