//! `--game-id` implementation: resolve and print one game's URL.

use crate::cli::types::ids::GameId;
use crate::error::Result;
use crate::server::open_in_browser;
use crate::site::{urls, SiteClient};

/// Print the game's launch-page URL, or the real free-play demo URL when
/// `demo` is set (one extra API call).
pub async fn handle_game_url(
    client: &SiteClient,
    id: GameId,
    demo: bool,
    open: bool,
) -> Result<()> {
    let url = if demo {
        client.warm().await;
        client.get_demo_link(id).await?
    } else {
        let config = client.config();
        urls::game_page_url(&config.base_url, &config.lang, id)
    };

    println!("{url}");
    if open {
        open_in_browser(&url);
    }
    Ok(())
}
