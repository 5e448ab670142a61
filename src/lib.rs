//! Casino game catalog scraper and local demo launcher.
//!
//! Consumes a gaming site's internal JSON endpoints to enumerate games
//! (name, provider, category, demo-launch URL), exports the catalog to
//! JSON or CSV, resolves individual free-play links, and serves a small
//! local launcher page with a synthetic "virtual balance" overlay hook.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use gamedex::site::{SiteClient, SiteConfig};
//!
//! # async fn example() -> gamedex::Result<()> {
//! let client = SiteClient::new(SiteConfig::default())?;
//! let categories = client.get_categories().await?;
//! println!("{} categories", categories.len());
//! # Ok(())
//! # }
//! ```
//!
//! The scraping pipeline is `site::http` (client + retries) →
//! `scrape` (pagination, per-category isolation) →
//! `site::normalize` (raw item → [`GameRecord`]) → `export` (JSON/CSV).
//! All site-specific URL knowledge lives in `site::urls`.

pub mod cli;
pub mod commands;
pub mod error;
pub mod export;
pub mod scrape;
pub mod server;
pub mod site;

// Re-export commonly used types
pub use cli::types::{CategoryId, GameId, OutputFormat};
pub use error::{GamedexError, Result};
pub use site::{Category, GameRecord};
