use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{json, Value};

use super::*;
use crate::cli::types::ids::CategoryId;
use crate::site::http::{GamesFilter, GamesSource};

/// In-memory catalog keyed by category filter.
#[derive(Default)]
struct FakeSource {
    items: BTreeMap<Option<u32>, Vec<Value>>,
    fail_categories: Vec<u32>,
    calls: Mutex<Vec<(Option<u32>, u32, u32)>>,
}

impl FakeSource {
    fn with_category(mut self, category: Option<u32>, items: Vec<Value>) -> Self {
        self.items.insert(category, items);
        self
    }

    fn failing(mut self, category: u32) -> Self {
        self.fail_categories.push(category);
        self
    }

    fn calls(&self) -> Vec<(Option<u32>, u32, u32)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl GamesSource for FakeSource {
    async fn fetch_page(
        &self,
        filter: &GamesFilter,
        offset: u32,
        limit: u32,
    ) -> crate::Result<Vec<Value>> {
        let key = filter.category_id.map(|c| c.as_u32());
        self.calls.lock().unwrap().push((key, offset, limit));

        if let Some(id) = key {
            if self.fail_categories.contains(&id) {
                return Err(crate::GamedexError::Fetch {
                    url: "https://example.test/web-api/tpmodels/games/1".to_string(),
                    status: Some(502),
                    message: "bad gateway".to_string(),
                });
            }
        }

        let items = self.items.get(&key).cloned().unwrap_or_default();
        let start = (offset as usize).min(items.len());
        let end = (start + limit as usize).min(items.len());
        Ok(items[start..end].to_vec())
    }
}

fn catalog_items(category: u32, count: u32) -> Vec<Value> {
    (0..count)
        .map(|i| {
            json!({
                "id": u64::from(category) * 100_000 + u64::from(i),
                "name": format!("Game {category}-{i}"),
                "brandName": "Fake Provider",
                "categories": [category],
                "has_demo": true
            })
        })
        .collect()
}

fn categories(ids: &[u32]) -> Vec<Category> {
    ids.iter()
        .map(|id| Category {
            id: CategoryId::new(*id),
            name: format!("Category {id}"),
            parent_id: None,
        })
        .collect()
}

fn request(category_ids: &[u32], page_size: u32, max: u64) -> ScrapeRequest {
    ScrapeRequest {
        base_url: "https://example.test".to_string(),
        lang: "en".to_string(),
        category_ids: category_ids.iter().map(|id| CategoryId::new(*id)).collect(),
        all_categories: false,
        brand_ids: Vec::new(),
        title_search: None,
        page_size,
        max_records: max,
        page_delay: Duration::ZERO,
        jobs: 1,
    }
}

#[test]
fn resolve_all_categories_excludes_pseudo_ids() {
    let req = ScrapeRequest {
        all_categories: true,
        ..request(&[], 50, 0)
    };
    let targets = resolve_targets(&req, &categories(&[40, 37, 998, 999, 0, 37]));
    let ids: Vec<u32> = targets.iter().map(|t| t.unwrap().as_u32()).collect();
    assert_eq!(ids, vec![37, 40]);
}

#[test]
fn resolve_explicit_and_default_targets() {
    let req = request(&[40, 37], 50, 0);
    let targets = resolve_targets(&req, &categories(&[37, 40]));
    assert_eq!(
        targets,
        vec![Some(CategoryId::new(40)), Some(CategoryId::new(37))]
    );

    let req = request(&[], 50, 0);
    assert_eq!(resolve_targets(&req, &categories(&[37])), vec![None]);
}

#[tokio::test]
async fn exactly_three_pages_for_250_items() {
    let source = Arc::new(
        FakeSource::default().with_category(Some(37), catalog_items(37, 250)),
    );
    let outcome = run_scrape(Arc::clone(&source), &categories(&[37]), &request(&[37], 100, 0)).await;

    assert_eq!(
        source.calls(),
        vec![(Some(37), 0, 100), (Some(37), 100, 100), (Some(37), 200, 100)]
    );
    assert_eq!(outcome.records.len(), 250);
    assert_eq!(outcome.report.requests, 3);

    let unique: HashSet<u64> = outcome.records.iter().map(|r| r.id.as_u64()).collect();
    assert_eq!(unique.len(), 250);
    assert!(outcome
        .records
        .iter()
        .all(|r| r.category_id == CategoryId::new(37)));
}

#[tokio::test]
async fn cap_limits_records_and_requests() {
    let source = Arc::new(
        FakeSource::default().with_category(Some(37), catalog_items(37, 500)),
    );
    let outcome = run_scrape(Arc::clone(&source), &categories(&[37]), &request(&[37], 100, 120)).await;

    assert_eq!(outcome.records.len(), 120);
    // Two full pages reach the cap; no third request.
    assert_eq!(source.calls().len(), 2);
}

#[tokio::test]
async fn empty_catalog_is_one_request() {
    let source = Arc::new(FakeSource::default());
    let outcome = run_scrape(Arc::clone(&source), &[], &request(&[], 50, 0)).await;

    assert_eq!(source.calls(), vec![(None, 0, 50)]);
    assert!(outcome.records.is_empty());
    assert_eq!(outcome.report.categories_ok, 1);
}

#[tokio::test]
async fn failed_category_does_not_abort_siblings() {
    let source = Arc::new(
        FakeSource::default()
            .with_category(Some(40), catalog_items(40, 10))
            .failing(37),
    );
    let outcome = run_scrape(
        Arc::clone(&source),
        &categories(&[37, 40]),
        &request(&[37, 40], 50, 0),
    )
    .await;

    assert_eq!(outcome.records.len(), 10);
    assert_eq!(outcome.report.categories_attempted, 2);
    assert_eq!(outcome.report.categories_ok, 1);
    assert_eq!(outcome.report.category_errors.len(), 1);
    assert_eq!(
        outcome.report.category_errors[0].0,
        Some(CategoryId::new(37))
    );
}

#[tokio::test]
async fn duplicate_ids_keep_first_discovery() {
    let shared = json!({
        "id": 7,
        "name": "First Category Copy",
        "categories": [37],
        "has_demo": true
    });
    let shadow = json!({
        "id": 7,
        "name": "Second Category Copy",
        "categories": [40],
        "has_demo": true
    });
    let source = Arc::new(
        FakeSource::default()
            .with_category(Some(37), vec![shared])
            .with_category(Some(40), vec![shadow]),
    );
    let outcome = run_scrape(
        Arc::clone(&source),
        &categories(&[37, 40]),
        &request(&[37, 40], 50, 0),
    )
    .await;

    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].name, "First Category Copy");
}

#[tokio::test]
async fn items_without_id_are_counted_not_exported() {
    let mut items = catalog_items(37, 3);
    items.insert(1, json!({"name": "No Id Here"}));
    let source = Arc::new(FakeSource::default().with_category(Some(37), items));
    let outcome = run_scrape(Arc::clone(&source), &categories(&[37]), &request(&[37], 50, 0)).await;

    assert_eq!(outcome.records.len(), 3);
    assert_eq!(outcome.report.skipped_items, 1);
    assert!(outcome.report.has_warnings());
    assert!(!outcome.records.iter().any(|r| r.name == "No Id Here"));
}

#[tokio::test]
async fn worker_pool_matches_sequential_output() {
    let source = Arc::new(
        FakeSource::default()
            .with_category(Some(37), catalog_items(37, 120))
            .with_category(Some(40), catalog_items(40, 80))
            .with_category(Some(41), catalog_items(41, 5)),
    );
    let cats = categories(&[37, 40, 41]);

    let sequential =
        run_scrape(Arc::clone(&source), &cats, &request(&[37, 40, 41], 50, 0)).await;
    let pooled = run_scrape(
        Arc::clone(&source),
        &cats,
        &ScrapeRequest {
            jobs: 4,
            ..request(&[37, 40, 41], 50, 0)
        },
    )
    .await;

    assert_eq!(sequential.records, pooled.records);
    assert_eq!(pooled.report.categories_ok, 3);
}
