//! Raw catalog items → normalized [`GameRecord`]s.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::debug;

use crate::cli::types::ids::CategoryId;
use crate::site::types::{Category, GameRecord, RawGame};
use crate::site::urls;

/// Read-only category id → name lookup built once per run.
#[derive(Debug, Default, Clone)]
pub struct CategoryTable(BTreeMap<u32, String>);

impl CategoryTable {
    pub fn new(categories: &[Category]) -> Self {
        Self(
            categories
                .iter()
                .map(|c| (c.id.as_u32(), c.name.clone()))
                .collect(),
        )
    }

    pub fn name(&self, id: CategoryId) -> Option<&str> {
        self.0.get(&id.as_u32()).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Everything normalization needs besides the item itself.
pub struct Normalizer<'a> {
    pub base_url: &'a str,
    pub lang: &'a str,
    pub categories: &'a CategoryTable,
    /// The category filter the page was fetched under, if any. Records
    /// inherit it; unfiltered scrapes fall back to the item's own first
    /// category.
    pub scraped_category: Option<CategoryId>,
}

impl Normalizer<'_> {
    /// Normalize one raw item.
    ///
    /// The only hard requirement is a numeric id: `None` means the item
    /// must be skipped (the caller counts it). Every other field degrades
    /// to empty/None. Upstream data referencing an unknown category yields
    /// an empty `category_name`, never a failure.
    pub fn normalize(&self, item: &Value) -> Option<GameRecord> {
        let raw: RawGame = match serde_json::from_value(item.clone()) {
            Ok(raw) => raw,
            Err(e) => {
                debug!(error = %e, "unparseable catalog item");
                return None;
            }
        };

        let id = match raw.id {
            Some(id) => crate::GameId::new(id),
            None => {
                debug!("catalog item without id, skipping");
                return None;
            }
        };

        let category_id = self
            .scraped_category
            .or_else(|| raw.categories.first().copied().map(CategoryId::new))
            .unwrap_or(CategoryId::new(0));
        let category_name = self
            .categories
            .name(category_id)
            .unwrap_or_default()
            .to_string();

        let demo_url = match raw.has_demo {
            Some(false) => None,
            _ => Some(match raw.game_url {
                // Direct URL on the item wins, verbatim.
                Some(url) if !url.is_empty() => url,
                _ => urls::demo_launch_url(self.base_url, self.lang, id),
            }),
        };

        Some(GameRecord {
            id,
            name: raw.name.unwrap_or_default(),
            provider: raw.brand_name.unwrap_or_default(),
            category_id,
            category_name,
            demo_url,
        })
    }
}
