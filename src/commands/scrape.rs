//! Catalog scrape: pagination, normalization, export.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tracing::warn;

use crate::cli::types::format::OutputFormat;
use crate::error::Result;
use crate::export;
use crate::scrape::{run_scrape, ScrapeRequest};
use crate::site::SiteClient;

use super::print_report;

/// Run a full scrape and write the export.
///
/// Per-category failures are collected and reported, not fatal - unless
/// every attempted category failed, in which case the first error
/// propagates and the process exits non-zero.
pub async fn handle_scrape(
    client: SiteClient,
    request: ScrapeRequest,
    format: OutputFormat,
    out: &Path,
) -> Result<()> {
    let started = Instant::now();
    client.warm().await;

    // One category listing per run: resolves --all-categories and names
    // the category ids records carry. Best-effort unless --all-categories
    // needs it to enumerate targets.
    let categories = match client.get_categories().await {
        Ok(categories) => categories,
        Err(e) if !request.all_categories => {
            warn!(error = %e, "category listing unavailable; names will be empty");
            Vec::new()
        }
        Err(e) => return Err(e),
    };

    let mut outcome = run_scrape(Arc::new(client), &categories, &request).await;

    // A run where nothing worked at all is an error; partial success is a
    // warning summary and a zero exit.
    if outcome.report.categories_ok == 0 && outcome.report.categories_attempted > 0 {
        return Err(outcome.report.category_errors.remove(0).1);
    }

    export::write_records(out, &outcome.records, format)?;

    println!(
        "Wrote {} games to {} in {:.2}s ({} requests)",
        outcome.records.len(),
        out.display(),
        started.elapsed().as_secs_f64(),
        outcome.report.requests,
    );
    print_report(&outcome.report);
    Ok(())
}
