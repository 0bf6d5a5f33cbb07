//! Gamedex
//!
//! Browse a remote game catalog from the terminal: search, filter by genre
//! and platform, sort by rating, keep favorites and rate games.

mod cli_types;
mod commands;
mod tui;

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use gamedex_config::GamedexConfig;
use gamedex_engine::CatalogEngine;

use crate::cli_types::{Cli, Commands};

const LOG_FILE: &str = "gamedex.log";

fn load_config(path: Option<&Path>) -> Result<GamedexConfig> {
    match path {
        Some(path) => GamedexConfig::load(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => GamedexConfig::load_default().context("Failed to load configuration"),
    }
}

/// Log to stderr, or to a file while the terminal browser owns the screen
fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

fn config_path(cli_path: Option<PathBuf>) -> Result<PathBuf> {
    cli_path
        .or_else(gamedex_config::default_config_path)
        .context("Could not determine a configuration directory; pass --config")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Tui);

    if let Commands::InitConfig { force } = command {
        init_logging(cli.verbose, None)?;
        return commands::init_config(&config_path(cli.config)?, force);
    }

    let config = load_config(cli.config.as_deref())?;

    let log_file = matches!(command, Commands::Tui).then(|| config.storage.data_dir.join(LOG_FILE));
    init_logging(cli.verbose, log_file.as_deref())?;
    info!("Gamedex starting (endpoint {})", config.api.base_url);

    let engine = CatalogEngine::open(&config).context("Failed to initialize the catalog")?;

    match command {
        Commands::Tui => tui::run(engine).await,
        Commands::Browse { filters, page } => commands::browse(&engine, &filters, page).await,
        Commands::Favorites => {
            commands::favorites(&engine);
            Ok(())
        }
        Commands::Favorite { id } => commands::toggle_favorite(&engine, &id).await,
        Commands::Rate { id, stars } => commands::rate(&engine, &id, stars),
        Commands::Show { id } => commands::show(&engine, &id).await,
        Commands::Filters => commands::filters(&engine).await,
        Commands::InitConfig { .. } => Ok(()),
    }
}
