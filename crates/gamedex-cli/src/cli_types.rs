//! Command line definitions

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use gamedex_library::RatingSort;

#[derive(Parser)]
#[command(name = "gamedex")]
#[command(about = "Browse, filter and rate the Gamedex game catalog", long_about = None)]
pub(crate) struct Cli {
    /// Configuration file (defaults to the platform config directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Search and filter arguments shared by listing commands
#[derive(Args, Clone, Debug, Default)]
pub(crate) struct FilterArgs {
    /// Case-insensitive name search
    #[arg(short, long)]
    pub search: Option<String>,

    /// Genre filter (e.g. Action, RPG), or "all"
    #[arg(short, long)]
    pub genre: Option<String>,

    /// Platform filter (PC, PlayStation, Xbox, Switch), or "all"
    #[arg(short, long)]
    pub platform: Option<String>,

    /// Sort by rating: none, asc or desc
    #[arg(long, value_parser = parse_sort)]
    pub sort: Option<RatingSort>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Interactive terminal browser (the default)
    Tui,

    /// Print one page of the catalog
    Browse {
        #[command(flatten)]
        filters: FilterArgs,

        /// Page to show, starting at 1
        #[arg(long, default_value_t = 1)]
        page: usize,
    },

    /// List favorite games
    Favorites,

    /// Add a game to favorites, or remove it if already there
    Favorite {
        /// Game id
        id: String,
    },

    /// Rate a game from 1 to 5 stars
    Rate {
        /// Game id
        id: String,

        /// Stars, 1 to 5
        #[arg(allow_negative_numbers = true)]
        stars: i64,
    },

    /// Show the full details of a game
    Show {
        /// Game id
        id: String,
    },

    /// List available genre and platform filters
    Filters,

    /// Write a configuration file with default values
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn parse_sort(value: &str) -> Result<RatingSort, String> {
    value.parse()
}
