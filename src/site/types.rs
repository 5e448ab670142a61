//! Payload types for the site's internal JSON endpoints and the normalized
//! output schema.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::cli::types::ids::{CategoryId, GameId};


/// The catalog endpoints are loosely typed: numeric fields sometimes arrive
/// as strings. Accept both, drop anything else.
fn lenient_u64(v: &Value) -> Option<u64> {
    match v {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn de_opt_lenient_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Value> = Deserialize::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(lenient_u64))
}

fn de_lenient_u32_list<'de, D>(deserializer: D) -> Result<Vec<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Value> = Deserialize::deserialize(deserializer)?;
    let items = match raw {
        Some(Value::Array(items)) => items,
        _ => return Ok(Vec::new()),
    };
    Ok(items
        .iter()
        .filter_map(lenient_u64)
        .filter_map(|n| u32::try_from(n).ok())
        .collect())
}

/// One raw catalog item as returned by the games endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawGame {
    #[serde(default, deserialize_with = "de_opt_lenient_u64")]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "brandName", default)]
    pub brand_name: Option<String>,
    #[serde(default, deserialize_with = "de_lenient_u32_list")]
    pub categories: Vec<u32>,
    #[serde(rename = "has_demo", default)]
    pub has_demo: Option<bool>,
    /// Direct launch URL, when the item carries one. Used verbatim.
    #[serde(rename = "gameUrl", alias = "game_url", alias = "url", default)]
    pub game_url: Option<String>,
}

/// Envelope of the games endpoint. Items stay as raw values so the
/// normalizer can count malformed entries instead of failing the page.
#[derive(Debug, Default, Deserialize)]
pub struct GamesPage {
    #[serde(default)]
    pub games: Vec<Value>,
}

/// A site-defined game grouping (the API calls them subcategories).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(rename = "parentId", default)]
    pub parent_id: Option<u32>,
}

/// Envelope of the options endpoint (`optionsKeys=brands,subcategories,...`).
#[derive(Debug, Default, Deserialize)]
pub struct OptionsResponse {
    #[serde(default)]
    pub subcategories: Vec<Value>,
}

impl OptionsResponse {
    /// Extract well-formed categories, tolerating partial entries.
    ///
    /// The display name falls back through `name`, `title`, `caption` the
    /// way the site's own front end does.
    pub fn categories(&self) -> Vec<Category> {
        self.subcategories
            .iter()
            .filter_map(|s| {
                let obj = s.as_object()?;
                let id = obj.get("id").and_then(lenient_u64)?;
                let id = u32::try_from(id).ok()?;
                let name = ["name", "title", "caption"]
                    .iter()
                    .find_map(|k| obj.get(*k).and_then(|v| v.as_str()))
                    .unwrap_or_default()
                    .to_string();
                let parent_id = obj
                    .get("parentId")
                    .and_then(lenient_u64)
                    .and_then(|n| u32::try_from(n).ok());
                Some(Category {
                    id: CategoryId::new(id),
                    name,
                    parent_id,
                })
            })
            .collect()
    }
}

/// Envelope of the game-url endpoint.
#[derive(Debug, Deserialize)]
pub struct GameUrlResponse {
    #[serde(default)]
    pub link: Option<String>,
}

/// One normalized catalog record: the fixed output schema.
///
/// Immutable once constructed; `demo_url` is `None` when the game has no
/// free-play mode (serialized as `null` in JSON, empty string in CSV).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub id: GameId,
    pub name: String,
    pub provider: String,
    pub category_id: CategoryId,
    pub category_name: String,
    pub demo_url: Option<String>,
}
