//! CLI argument definitions and parsing.

pub mod types;

use std::path::PathBuf;

use clap::Parser;

use crate::error::{GamedexError, Result};
use types::{CategoryId, GameId, OutputFormat};

/// Scrape a gaming site's catalog endpoints, export the results,
/// and optionally serve a local demo launcher.
#[derive(Debug, Parser)]
#[clap(name = "gamedex", about = "Casino game catalog scraper and local demo launcher")]
pub struct Gamedex {
    /// Site base URL.
    #[clap(long, default_value = crate::site::DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Site language code (used in page URLs and Accept-Language).
    #[clap(long, default_value = crate::site::DEFAULT_LANG)]
    pub lang: String,

    /// Print known category id/name pairs and exit.
    #[clap(long)]
    pub list_categories: bool,

    /// Scrape every known category.
    #[clap(long)]
    pub all_categories: bool,

    /// Scrape only the given category id(s) - repeatable.
    #[clap(long = "category-id")]
    pub category_ids: Vec<CategoryId>,

    /// Filter by provider/brand id(s) - repeatable.
    #[clap(long = "brand-id")]
    pub brand_ids: Vec<u32>,

    /// Upstream title substring filter.
    #[clap(long)]
    pub search: Option<String>,

    /// Cap total records (0 = unbounded).
    #[clap(long, default_value_t = 0)]
    pub max: u64,

    /// Page size for catalog requests.
    #[clap(long, default_value_t = 50)]
    pub limit: u32,

    /// Delay between page requests, in milliseconds.
    #[clap(long, default_value_t = 200)]
    pub sleep_ms: u64,

    /// Retries for transient request failures.
    #[clap(long, default_value_t = 5)]
    pub retries: u32,

    /// Base retry backoff, in milliseconds (doubles per attempt).
    #[clap(long, default_value_t = 750)]
    pub backoff_ms: u64,

    /// Bounded worker pool size for multi-category runs (1..=8).
    #[clap(long, default_value_t = 1)]
    pub jobs: usize,

    /// Output format.
    #[clap(long, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Output file path (defaults to games.json / games.csv).
    #[clap(long)]
    pub out: Option<PathBuf>,

    /// Resolve a single game's URL instead of scraping.
    #[clap(long)]
    pub game_id: Option<GameId>,

    /// With --game-id: resolve the free-play demo URL via the site API.
    #[clap(long)]
    pub demo: bool,

    /// Open the resolved URL in a browser (xdg-open).
    #[clap(long)]
    pub open: bool,

    /// Start the local launcher server.
    #[clap(long)]
    pub serve: bool,

    /// Start the server and open a browser session on this game id.
    #[clap(long)]
    pub launch: Option<GameId>,

    /// Launcher server port.
    #[clap(long, default_value_t = 8777)]
    pub port: u16,

    /// Directory the launcher reads exported files from.
    #[clap(long)]
    pub data_dir: Option<PathBuf>,

    /// Enable debug-level logging.
    #[clap(long, short)]
    pub verbose: bool,
}

/// What a single invocation should actually do, after validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    ListCategories,
    GameUrl(GameId),
    Serve,
    Scrape,
}

impl Gamedex {
    /// Validate flag combinations and pick the run mode.
    ///
    /// All conflicts are reported here, before any network call is made.
    pub fn mode(&self) -> Result<Mode> {
        if self.all_categories && !self.category_ids.is_empty() {
            return Err(GamedexError::Config(
                "--all-categories cannot be combined with --category-id".to_string(),
            ));
        }
        if self.demo && self.game_id.is_none() {
            return Err(GamedexError::Config(
                "--demo requires --game-id".to_string(),
            ));
        }
        if self.serve && self.launch.is_some() {
            return Err(GamedexError::Config(
                "--serve and --launch are mutually exclusive (--launch already starts the server)"
                    .to_string(),
            ));
        }
        if self.jobs == 0 || self.jobs > 8 {
            return Err(GamedexError::Config(
                "--jobs must be between 1 and 8".to_string(),
            ));
        }

        if let Some(id) = self.game_id {
            Ok(Mode::GameUrl(id))
        } else if self.list_categories {
            Ok(Mode::ListCategories)
        } else if self.serve || self.launch.is_some() {
            Ok(Mode::Serve)
        } else {
            Ok(Mode::Scrape)
        }
    }

    /// Output path, defaulting to `games.<ext>` in the current directory.
    pub fn out_path(&self) -> PathBuf {
        self.out
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("games.{}", self.format.extension())))
    }
}
