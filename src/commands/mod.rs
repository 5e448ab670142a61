//! Command implementations dispatched from `main`.

pub mod game_url;
pub mod list_categories;
pub mod scrape;
pub mod serve;

use crate::scrape::RunReport;

/// Print the end-of-run warning tally. Every skipped item and failed
/// category shows up here; nothing is silently dropped.
pub fn print_report(report: &RunReport) {
    if report.skipped_items > 0 {
        println!(
            "⚠ Skipped {} item(s) without a usable id",
            report.skipped_items
        );
    }
    for (category, error) in &report.category_errors {
        match category {
            Some(id) => println!("⚠ Category {id} failed: {error}"),
            None => println!("⚠ Catalog scrape failed: {error}"),
        }
    }
}
