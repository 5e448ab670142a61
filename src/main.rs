//! Entry point: parse CLI and dispatch to command handlers.

use std::time::Duration;

use clap::Parser;
use gamedex::{
    cli::{Gamedex, Mode},
    commands::{
        game_url::handle_game_url, list_categories::handle_list_categories,
        scrape::handle_scrape, serve::handle_serve,
    },
    scrape::ScrapeRequest,
    server::{default_data_dir, ServerConfig},
    site::{RetryPolicy, SiteClient, SiteConfig},
    Result,
};

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let app = Gamedex::parse();
    init_tracing(app.verbose);

    // All flag conflicts are rejected here, before any network call.
    let mode = app.mode()?;

    let site_config = SiteConfig {
        base_url: app.base_url.trim_end_matches('/').to_string(),
        lang: app.lang.clone(),
        timeout: Duration::from_secs(30),
        retry: RetryPolicy {
            max_retries: app.retries,
            base_delay: Duration::from_millis(app.backoff_ms),
        },
    };

    match mode {
        Mode::ListCategories => {
            let client = SiteClient::new(site_config)?;
            handle_list_categories(&client).await?;
        }
        Mode::GameUrl(id) => {
            let client = SiteClient::new(site_config)?;
            handle_game_url(&client, id, app.demo, app.open).await?;
        }
        Mode::Serve => {
            let config = ServerConfig {
                port: app.port,
                data_dir: app.data_dir.clone().unwrap_or_else(default_data_dir),
            };
            handle_serve(config, app.launch).await?;
        }
        Mode::Scrape => {
            let request = ScrapeRequest {
                base_url: site_config.base_url.clone(),
                lang: site_config.lang.clone(),
                category_ids: app.category_ids.clone(),
                all_categories: app.all_categories,
                brand_ids: app.brand_ids.clone(),
                title_search: app.search.clone(),
                page_size: app.limit,
                max_records: app.max,
                page_delay: Duration::from_millis(app.sleep_ms),
                jobs: app.jobs,
            };
            let client = SiteClient::new(site_config)?;
            handle_scrape(client, request, app.format, &app.out_path()).await?;
        }
    }

    Ok(())
}
