//! End-to-end pipeline tests: fake catalog source → scrape → export →
//! re-import → launcher filtering.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};

use gamedex::{
    cli::types::format::OutputFormat,
    export,
    scrape::{run_scrape, ScrapeRequest},
    server::filter_games,
    site::http::{GamesFilter, GamesSource},
    Category, CategoryId, Result,
};

/// Fixed two-category catalog: 120 slots, 30 live games (3 without demo,
/// 1 without id).
struct FixtureSource;

fn slots_item(i: u64) -> Value {
    json!({
        "id": 1000 + i,
        "name": format!("Slot Game {i}"),
        "brandName": "Pragmatic Play",
        "categories": [37],
        "has_demo": true
    })
}

fn live_item(i: u64) -> Value {
    json!({
        "id": 2000 + i,
        "name": format!("Live Table {i}"),
        "brandName": "Evolution",
        "categories": [40],
        "has_demo": i % 10 != 0
    })
}

#[async_trait::async_trait]
impl GamesSource for FixtureSource {
    async fn fetch_page(
        &self,
        filter: &GamesFilter,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<Value>> {
        let mut items: Vec<Value> = match filter.category_id.map(|c| c.as_u32()) {
            Some(37) => (0..120).map(slots_item).collect(),
            Some(40) => {
                let mut v: Vec<Value> = (0..30).map(live_item).collect();
                v.push(json!({"name": "broken item without id"}));
                v
            }
            _ => Vec::new(),
        };
        let start = (offset as usize).min(items.len());
        let end = (start + limit as usize).min(items.len());
        Ok(items.drain(..).skip(start).take(end - start).collect())
    }
}

fn categories() -> Vec<Category> {
    vec![
        Category {
            id: CategoryId::new(37),
            name: "Slots".to_string(),
            parent_id: None,
        },
        Category {
            id: CategoryId::new(40),
            name: "Live Casino".to_string(),
            parent_id: None,
        },
    ]
}

fn request() -> ScrapeRequest {
    ScrapeRequest {
        base_url: "https://melbet-tn.com".to_string(),
        lang: "en".to_string(),
        category_ids: vec![CategoryId::new(37), CategoryId::new(40)],
        all_categories: false,
        brand_ids: Vec::new(),
        title_search: None,
        page_size: 50,
        max_records: 0,
        page_delay: Duration::ZERO,
        jobs: 1,
    }
}

#[tokio::test]
async fn scrape_export_reimport_round_trip() {
    let outcome = run_scrape(Arc::new(FixtureSource), &categories(), &request()).await;

    assert_eq!(outcome.records.len(), 150);
    assert_eq!(outcome.report.skipped_items, 1);
    assert_eq!(outcome.report.categories_ok, 2);

    // Category names resolved from the run's category listing.
    let slot = outcome.records.iter().find(|r| r.id.as_u64() == 1003).unwrap();
    assert_eq!(slot.category_name, "Slots");
    assert_eq!(slot.provider, "Pragmatic Play");
    assert!(slot.demo_url.as_deref().unwrap().contains("game=1003"));

    let dir = tempfile::tempdir().unwrap();

    // JSON round trip is exact.
    let json_path = dir.path().join("games.json");
    export::write_records(&json_path, &outcome.records, OutputFormat::Json).unwrap();
    let reread = export::read_records(&json_path).unwrap();
    assert_eq!(reread, outcome.records);

    // CSV round trip: identical, with None demo_url surviving as None.
    let csv_path = dir.path().join("games.csv");
    export::write_records(&csv_path, &outcome.records, OutputFormat::Csv).unwrap();
    let reread = export::read_records(&csv_path).unwrap();
    assert_eq!(reread, outcome.records);
    assert!(reread.iter().any(|r| r.demo_url.is_none()));

    // Launcher-side filtering over the re-imported data.
    assert_eq!(filter_games(&reread, "evolution").len(), 30);
    assert_eq!(filter_games(&reread, "Slot Game 1").len(), 31); // 1, 10..19, 100..119
    assert_eq!(filter_games(&reread, "").len(), 150);
}

#[tokio::test]
async fn category_filter_returns_only_that_category() {
    let mut req = request();
    req.category_ids = vec![CategoryId::new(40)];
    let outcome = run_scrape(Arc::new(FixtureSource), &categories(), &req).await;

    assert_eq!(outcome.records.len(), 30);
    assert!(outcome
        .records
        .iter()
        .all(|r| r.category_id == CategoryId::new(40)));
}

#[tokio::test]
async fn max_caps_total_records() {
    let mut req = request();
    req.max_records = 42;
    let outcome = run_scrape(Arc::new(FixtureSource), &categories(), &req).await;
    assert_eq!(outcome.records.len(), 42);
}
