//! Serialization of scraped records to JSON/CSV files and back.
//!
//! The launcher server reads these files; it never writes them. CSV is
//! lossy in exactly one way: a `None` demo_url is written as an empty
//! string and reads back as `None` (so `Some("")` is not representable).

pub mod csv;

use std::fs;
use std::path::Path;

use tracing::warn;

use crate::cli::types::format::OutputFormat;
use crate::cli::types::ids::{CategoryId, GameId};
use crate::error::{GamedexError, Result};
use crate::site::types::GameRecord;

/// Column order of the CSV form; matches the JSON field names.
pub const CSV_HEADER: [&str; 6] = [
    "id",
    "name",
    "provider",
    "category_id",
    "category_name",
    "demo_url",
];

/// Render records as a pretty-printed UTF-8 JSON array.
pub fn to_json(records: &[GameRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

pub fn from_json(text: &str) -> Result<Vec<GameRecord>> {
    Ok(serde_json::from_str(text)?)
}

/// Render records as RFC-4180 CSV with a header row.
pub fn to_csv(records: &[GameRecord]) -> Result<String> {
    let mut buf: Vec<u8> = Vec::new();
    let header: Vec<String> = CSV_HEADER.iter().map(|h| h.to_string()).collect();
    csv::write_row(&mut buf, &header)?;
    for record in records {
        let row = vec![
            record.id.to_string(),
            record.name.clone(),
            record.provider.clone(),
            record.category_id.to_string(),
            record.category_name.clone(),
            record.demo_url.clone().unwrap_or_default(),
        ];
        csv::write_row(&mut buf, &row)?;
    }
    // write_row only emits UTF-8
    Ok(String::from_utf8(buf).unwrap_or_default())
}

/// Parse CSV text back into records.
///
/// Malformed rows (wrong column count, non-numeric ids) are skipped with a
/// warning, mirroring the scrape-side skip policy.
pub fn from_csv(text: &str) -> Vec<GameRecord> {
    let mut rows = parse_data_rows(text);
    let mut out = Vec::with_capacity(rows.len());
    for row in rows.drain(..) {
        match parse_csv_row(&row) {
            Some(record) => out.push(record),
            None => warn!(?row, "skipping malformed CSV row"),
        }
    }
    out
}

fn parse_data_rows(text: &str) -> Vec<Vec<String>> {
    let mut rows = csv::parse_rows(text);
    if rows
        .first()
        .is_some_and(|r| r.first().is_some_and(|c| c.eq_ignore_ascii_case("id")))
    {
        rows.remove(0);
    }
    rows
}

fn parse_csv_row(row: &[String]) -> Option<GameRecord> {
    if row.len() != CSV_HEADER.len() {
        return None;
    }
    Some(GameRecord {
        id: GameId::new(row[0].parse().ok()?),
        name: row[1].clone(),
        provider: row[2].clone(),
        category_id: CategoryId::new(row[3].parse().ok()?),
        category_name: row[4].clone(),
        demo_url: if row[5].is_empty() {
            None
        } else {
            Some(row[5].clone())
        },
    })
}

/// Write records to `path` in the given format.
pub fn write_records(path: &Path, records: &[GameRecord], format: OutputFormat) -> Result<()> {
    let body = match format {
        OutputFormat::Json => to_json(records)?,
        OutputFormat::Csv => to_csv(records)?,
    };
    fs::write(path, body).map_err(|source| GamedexError::Export {
        path: path.to_path_buf(),
        source,
    })
}

/// Read records back from an exported file, inferring the format from the
/// file extension.
pub fn read_records(path: &Path) -> Result<Vec<GameRecord>> {
    let text = fs::read_to_string(path)?;
    match OutputFormat::from_path(path) {
        OutputFormat::Json => from_json(&text).map_err(|e| GamedexError::Import {
            path: path.to_path_buf(),
            message: e.to_string(),
        }),
        OutputFormat::Csv => Ok(from_csv(&text)),
    }
}
