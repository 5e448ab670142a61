//! `--list-categories` implementation.

use crate::error::Result;
use crate::site::SiteClient;

/// Print the category listing as JSON, one run of the options endpoint and
/// nothing else (no game-page requests).
pub async fn handle_list_categories(client: &SiteClient) -> Result<()> {
    client.warm().await;
    let categories = client.get_categories().await?;
    println!("{}", serde_json::to_string_pretty(&categories)?);
    Ok(())
}
