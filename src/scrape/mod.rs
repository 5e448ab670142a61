//! Pagination loop and multi-category scrape orchestration.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::cli::types::ids::CategoryId;
use crate::error::{GamedexError, Result};
use crate::site::http::{GamesFilter, GamesSource};
use crate::site::normalize::{CategoryTable, Normalizer};
use crate::site::types::{Category, GameRecord};

/// Safety valve against an upstream bug that never terminates pagination.
pub const MAX_PAGES_PER_CATEGORY: u32 = 200;

/// Pseudo-categories the site uses for internal grouping; excluded from
/// `--all-categories` runs, matching the site's own front end.
pub const EXCLUDED_CATEGORY_IDS: [u32; 2] = [998, 999];

/// One scrape run's input, built once from the CLI.
#[derive(Debug, Clone)]
pub struct ScrapeRequest {
    pub base_url: String,
    pub lang: String,
    /// Explicit category ids; empty means "no category filter" unless
    /// `all_categories` is set.
    pub category_ids: Vec<CategoryId>,
    pub all_categories: bool,
    pub brand_ids: Vec<u32>,
    pub title_search: Option<String>,
    pub page_size: u32,
    /// 0 = unbounded.
    pub max_records: u64,
    pub page_delay: Duration,
    /// Bounded worker pool size; 1 = sequential.
    pub jobs: usize,
}

/// Per-run warning/error tally. Nothing is silently swallowed: every
/// skipped item and failed category ends up here.
#[derive(Debug, Default)]
pub struct RunReport {
    pub skipped_items: u64,
    pub requests: u64,
    pub category_errors: Vec<(Option<CategoryId>, GamedexError)>,
    pub categories_ok: usize,
    pub categories_attempted: usize,
}

impl RunReport {
    pub fn has_warnings(&self) -> bool {
        self.skipped_items > 0 || !self.category_errors.is_empty()
    }
}

#[derive(Debug)]
pub struct ScrapeOutcome {
    pub records: Vec<GameRecord>,
    pub report: RunReport,
}

/// What one category's pagination produced.
#[derive(Debug, Default)]
pub struct CategoryScrape {
    pub records: Vec<GameRecord>,
    pub skipped: u64,
    pub requests: u64,
}

/// Turn the request into the list of category targets to paginate.
/// `None` is the unfiltered catalog.
pub fn resolve_targets(
    request: &ScrapeRequest,
    categories: &[Category],
) -> Vec<Option<CategoryId>> {
    if request.all_categories {
        let mut ids: Vec<u32> = categories
            .iter()
            .map(|c| c.id.as_u32())
            .filter(|id| *id > 0 && !EXCLUDED_CATEGORY_IDS.contains(id))
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids.into_iter().map(|id| Some(CategoryId::new(id))).collect()
    } else if !request.category_ids.is_empty() {
        request.category_ids.iter().copied().map(Some).collect()
    } else {
        vec![None]
    }
}

/// Paginate one category (or the unfiltered catalog) to exhaustion.
///
/// Stops on a short or empty page, when `budget` (0 = none) is reached, or
/// at [`MAX_PAGES_PER_CATEGORY`]. A fetch error mid-pagination aborts this
/// category only; the caller decides what happens to siblings.
pub async fn scrape_category<S: GamesSource + ?Sized>(
    source: &S,
    normalizer: &Normalizer<'_>,
    filter: &GamesFilter,
    page_size: u32,
    budget: u64,
    page_delay: Duration,
) -> Result<CategoryScrape> {
    let mut out = CategoryScrape::default();
    let mut offset = 0u32;

    for page in 0..MAX_PAGES_PER_CATEGORY {
        let items = source.fetch_page(filter, offset, page_size).await?;
        out.requests += 1;
        let raw_count = items.len();

        for item in &items {
            match normalizer.normalize(item) {
                Some(record) => out.records.push(record),
                None => out.skipped += 1,
            }
        }
        debug!(
            category = ?filter.category_id,
            page,
            offset,
            items = raw_count,
            total = out.records.len(),
            "scraped page"
        );

        // Short page means the category is exhausted.
        if raw_count < page_size as usize {
            break;
        }
        if budget > 0 && out.records.len() as u64 >= budget {
            break;
        }

        offset += page_size;
        if !page_delay.is_zero() {
            tokio::time::sleep(page_delay).await;
        }
    }

    if budget > 0 {
        out.records.truncate(budget as usize);
    }
    Ok(out)
}

/// Concatenate per-category results in target order, dropping duplicate ids
/// (first discovery wins), and fold the tallies into one report.
fn merge_results(
    results: Vec<(Option<CategoryId>, Result<CategoryScrape>)>,
    max_records: u64,
) -> ScrapeOutcome {
    let mut records: Vec<GameRecord> = Vec::new();
    let mut seen: HashSet<u64> = HashSet::new();
    let mut report = RunReport {
        categories_attempted: results.len(),
        ..RunReport::default()
    };

    for (target, result) in results {
        match result {
            Ok(scrape) => {
                report.categories_ok += 1;
                report.skipped_items += scrape.skipped;
                report.requests += scrape.requests;
                for record in scrape.records {
                    if seen.insert(record.id.as_u64()) {
                        records.push(record);
                    }
                }
            }
            Err(e) => {
                warn!(category = ?target, error = %e, "category scrape failed");
                report.category_errors.push((target, e));
            }
        }
    }

    if max_records > 0 {
        records.truncate(max_records as usize);
    }
    ScrapeOutcome { records, report }
}

fn filter_for(request: &ScrapeRequest, target: Option<CategoryId>) -> GamesFilter {
    GamesFilter {
        category_id: target,
        brand_ids: request.brand_ids.clone(),
        title_search: request.title_search.clone(),
    }
}

/// Drive a whole scrape run over the resolved targets.
///
/// Sequential when `jobs == 1`; otherwise a bounded worker pool where each
/// worker returns its own record list and results are merged in category
/// order afterwards (no shared mutable accumulation).
pub async fn run_scrape<S: GamesSource + ?Sized + 'static>(
    source: Arc<S>,
    categories: &[Category],
    request: &ScrapeRequest,
) -> ScrapeOutcome {
    let targets = resolve_targets(request, categories);
    let table = Arc::new(CategoryTable::new(categories));

    if request.jobs <= 1 {
        let normalizer_table = Arc::clone(&table);
        let mut results = Vec::with_capacity(targets.len());
        let mut seen: HashSet<u64> = HashSet::new();

        for target in targets {
            let normalizer = Normalizer {
                base_url: &request.base_url,
                lang: &request.lang,
                categories: &*normalizer_table,
                scraped_category: target,
            };
            let result = scrape_category(
                &*source,
                &normalizer,
                &filter_for(request, target),
                request.page_size,
                request.max_records,
                request.page_delay,
            )
            .await;

            if let Ok(scrape) = &result {
                for record in &scrape.records {
                    seen.insert(record.id.as_u64());
                }
            }
            results.push((target, result));

            if request.max_records > 0 && seen.len() as u64 >= request.max_records {
                break;
            }
        }
        return merge_results(results, request.max_records);
    }

    // Bounded pool: at most `jobs` categories in flight.
    let mut set: JoinSet<(usize, Option<CategoryId>, Result<CategoryScrape>)> = JoinSet::new();
    let mut results: Vec<Option<(Option<CategoryId>, Result<CategoryScrape>)>> =
        (0..targets.len()).map(|_| None).collect();

    for (index, target) in targets.iter().copied().enumerate() {
        while set.len() >= request.jobs {
            if let Some(Ok((i, t, r))) = set.join_next().await {
                results[i] = Some((t, r));
            }
        }
        let source = Arc::clone(&source);
        let table = Arc::clone(&table);
        let request = request.clone();
        set.spawn(async move {
            let normalizer = Normalizer {
                base_url: &request.base_url,
                lang: &request.lang,
                categories: &*table,
                scraped_category: target,
            };
            let result = scrape_category(
                &*source,
                &normalizer,
                &filter_for(&request, target),
                request.page_size,
                request.max_records,
                request.page_delay,
            )
            .await;
            (index, target, result)
        });
    }
    while let Some(joined) = set.join_next().await {
        if let Ok((i, t, r)) = joined {
            results[i] = Some((t, r));
        }
    }

    merge_results(
        results.into_iter().flatten().collect(),
        request.max_records,
    )
}

#[cfg(test)]
mod tests;
