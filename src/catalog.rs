//! Discovery catalog: one row per indicator with a usable normalized series.
//!
//! The catalog is fully derived. It is rebuilt by scanning the series store and
//! never edited by hand.

use std::collections::HashSet;
use std::fs::{self, File};
use std::path::Path;
use std::time::SystemTime;

use tracing::{info, warn};

use crate::domain::{CatalogEntry, YearMonth};
use crate::error::MtmError;
use crate::io::series::{SeriesStore, write_atomically};
use crate::registry::IndicatorRegistry;

const HEADER: [&str; 7] = ["indicator_id", "display", "country", "category", "start", "end", "rows"];

/// Why `ensure_catalog` did or did not rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogStatus {
    Missing,
    Stale,
    Fresh,
}

/// Scan the store and summarize every ready indicator.
///
/// Indicators without a series file, or with an empty one, are omitted. An
/// unreadable series is logged and omitted so one bad file does not hide the
/// rest of the catalog.
pub fn build_catalog(registry: &IndicatorRegistry, store: &SeriesStore) -> Vec<CatalogEntry> {
    let mut entries = Vec::new();

    for def in registry.iter() {
        if !store.exists(&def.id) {
            continue;
        }
        let series = match store.load(&def.id) {
            Ok(series) => series,
            Err(err) => {
                warn!(indicator = %def.id, error = %err, "skipping unreadable normalized series");
                continue;
            }
        };
        let (Some(start), Some(end)) = (series.first_date(), series.last_date()) else {
            continue;
        };

        entries.push(CatalogEntry {
            indicator_id: def.id.clone(),
            display: def.display.clone(),
            country: def.country.clone(),
            category: def.category.clone(),
            start,
            end,
            rows: series.len(),
        });
    }

    entries.sort_by(|a, b| {
        (&a.country, &a.category, &a.indicator_id).cmp(&(&b.country, &b.category, &b.indicator_id))
    });
    entries
}

/// Build the catalog and replace the file at `path`.
pub fn rebuild_catalog(
    registry: &IndicatorRegistry,
    store: &SeriesStore,
    path: &Path,
) -> Result<Vec<CatalogEntry>, MtmError> {
    let entries = build_catalog(registry, store);
    write_catalog(path, &entries)?;
    info!(path = %path.display(), entries = entries.len(), "catalog written");
    Ok(entries)
}

/// Read the catalog, rebuilding it first when it no longer describes the store.
///
/// The catalog is stale when a registered series was written at or after the
/// catalog, when it lists an indicator whose series is gone or that the
/// registry does not know (or describes differently), or when a non-empty
/// series is missing from it.
pub fn ensure_catalog(
    registry: &IndicatorRegistry,
    store: &SeriesStore,
    path: &Path,
) -> Result<(Vec<CatalogEntry>, CatalogStatus), MtmError> {
    let status = match modified(path) {
        None => CatalogStatus::Missing,
        Some(catalog_mtime) if series_touched_since(registry, store, catalog_mtime) => CatalogStatus::Stale,
        Some(_) => match read_catalog(path) {
            Ok(entries) if describes_store(registry, store, &entries) => {
                return Ok((entries, CatalogStatus::Fresh));
            }
            Ok(_) => CatalogStatus::Stale,
            Err(err) => {
                warn!(error = %err, "unreadable catalog");
                CatalogStatus::Stale
            }
        },
    };
    info!(?status, path = %path.display(), "rebuilding catalog");
    Ok((rebuild_catalog(registry, store, path)?, status))
}

fn series_touched_since(registry: &IndicatorRegistry, store: &SeriesStore, catalog_mtime: SystemTime) -> bool {
    registry
        .iter()
        .filter_map(|def| modified(&store.path_for(&def.id)))
        .any(|series_mtime| series_mtime >= catalog_mtime)
}

fn describes_store(registry: &IndicatorRegistry, store: &SeriesStore, entries: &[CatalogEntry]) -> bool {
    let listed: HashSet<&str> = entries.iter().map(|e| e.indicator_id.as_str()).collect();
    if listed.len() != entries.len() {
        return false;
    }

    let entries_match = entries.iter().all(|e| match registry.get(&e.indicator_id) {
        Some(def) => {
            store.exists(&def.id) && def.display == e.display && def.country == e.country && def.category == e.category
        }
        None => false,
    });

    // Unlisted series must be ones the builder would omit anyway.
    entries_match
        && registry
            .iter()
            .filter(|def| !listed.contains(def.id.as_str()) && store.exists(&def.id))
            .all(|def| store.load(&def.id).map_or(true, |series| series.is_empty()))
}

fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

pub fn write_catalog(path: &Path, entries: &[CatalogEntry]) -> Result<(), MtmError> {
    write_atomically(path, |file| {
        let mut writer = csv::Writer::from_writer(file);
        writer.write_record(HEADER).map_err(|e| e.to_string())?;
        for e in entries {
            writer
                .write_record([
                    e.indicator_id.clone(),
                    e.display.clone(),
                    e.country.clone(),
                    e.category.clone(),
                    YearMonth::of(e.start).to_string(),
                    YearMonth::of(e.end).to_string(),
                    e.rows.to_string(),
                ])
                .map_err(|e| e.to_string())?;
        }
        writer.flush().map_err(|e| e.to_string())
    })
}

/// Read a catalog file; `start`/`end` come back as month-end dates.
pub fn read_catalog(path: &Path) -> Result<Vec<CatalogEntry>, MtmError> {
    let file = File::open(path).map_err(|e| MtmError::io("Failed to open catalog", path, e))?;
    let mut reader = csv::Reader::from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| MtmError::data(path, format!("unreadable header: {e}")))?;
    if headers.iter().collect::<Vec<_>>() != HEADER {
        return Err(MtmError::data(path, format!("unexpected catalog header {headers:?}")));
    }

    let mut entries = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        let record = result.map_err(|e| MtmError::data(path, format!("line {line}: {e}")))?;
        let field = |i: usize| record.get(i).unwrap_or_default().to_string();
        let month = |i: usize| {
            field(i)
                .parse::<YearMonth>()
                .map_err(|_| MtmError::data(path, format!("line {line}: invalid month '{}'", field(i))))
        };
        let rows = field(6)
            .parse::<usize>()
            .map_err(|_| MtmError::data(path, format!("line {line}: invalid row count")))?;

        entries.push(CatalogEntry {
            indicator_id: field(0),
            display: field(1),
            country: field(2),
            category: field(3),
            start: month(4)?.last_day(),
            end: month(5)?.last_day(),
            rows,
        });
    }
    Ok(entries)
}

/// Sorted distinct categories, for selection menus.
pub fn categories(entries: &[CatalogEntry]) -> Vec<String> {
    let mut out: Vec<String> = entries.iter().map(|e| e.category.clone()).collect();
    out.sort();
    out.dedup();
    out
}

pub fn filter_by_category<'a>(entries: &'a [CatalogEntry], category: &str) -> Vec<&'a CatalogEntry> {
    entries
        .iter()
        .filter(|e| e.category.eq_ignore_ascii_case(category.trim()))
        .collect()
}
