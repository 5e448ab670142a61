//! URL construction for the target site.
//!
//! Every piece of site-specific URL knowledge lives here, so a markup or
//! routing change upstream touches exactly one module.

use crate::cli::types::ids::GameId;

/// Page that lists the catalog; also the warm-up target for cookies.
pub fn slots_page_url(base_url: &str, lang: &str) -> String {
    format!("{}/{}/slots", base_url.trim_end_matches('/'), lang)
}

/// Launch page for one game.
pub fn game_page_url(base_url: &str, lang: &str, id: GameId) -> String {
    format!("{}?game={}", slots_page_url(base_url, lang), id)
}

/// Free-play launch page for one game.
///
/// Used as the composed `demo_url` when a raw item carries no direct URL.
pub fn demo_launch_url(base_url: &str, lang: &str, id: GameId) -> String {
    format!("{}&demo=true", game_page_url(base_url, lang, id))
}

/// Host-with-trailing-slash form the game-url endpoint expects as
/// `launchDomain`.
pub fn launch_domain(base_url: &str) -> String {
    let host = base_url
        .trim_end_matches('/')
        .trim_start_matches("https://")
        .trim_start_matches("http://");
    format!("{host}/")
}
