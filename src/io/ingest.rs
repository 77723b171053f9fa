//! Raw CSV ingest: column detection and tolerant row coercion.
//!
//! This module is responsible for turning a heterogeneous single-series export
//! into a clean list of `(date, value)` observations.
//!
//! Design goals:
//! - **Strict schema** for the column mapping (an ambiguous file is an error)
//! - **Tolerant rows**: a bad date or non-numeric value drops the row silently
//! - **Separation of concerns**: no resampling logic here

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;
use tracing::debug;

use crate::domain::Observation;
use crate::error::MtmError;

/// Names and positions of the detected date and value columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedColumns {
    pub date: String,
    pub value: String,
    pub date_idx: usize,
    pub value_idx: usize,
}

/// Observations read from one raw file, plus row accounting.
#[derive(Debug, Clone)]
pub struct RawSeries {
    pub observations: Vec<Observation>,
    pub columns: DetectedColumns,
    pub rows_read: usize,
    pub rows_dropped: usize,
}

/// Identify the date column and the value column from header names.
///
/// - exactly two columns: `[date, value]` by position, whatever the names
///   (FRED exports look like `observation_date,FEDFUNDS`)
/// - otherwise: the first header containing "date" (case-insensitive) plus
///   exactly one remaining column
pub fn detect_columns<S: AsRef<str>>(headers: &[S]) -> Result<DetectedColumns, String> {
    let names: Vec<String> = headers.iter().map(|h| normalize_header_name(h.as_ref())).collect();

    if names.len() == 2 {
        return Ok(DetectedColumns {
            date: names[0].clone(),
            value: names[1].clone(),
            date_idx: 0,
            value_idx: 1,
        });
    }

    let date_idx = names
        .iter()
        .position(|n| n.to_lowercase().contains("date"))
        .ok_or_else(|| format!("no date column among {names:?}"))?;

    let value_candidates: Vec<usize> = (0..names.len()).filter(|&i| i != date_idx).collect();
    match value_candidates.as_slice() {
        [value_idx] => Ok(DetectedColumns {
            date: names[date_idx].clone(),
            value: names[*value_idx].clone(),
            date_idx,
            value_idx: *value_idx,
        }),
        others => Err(format!(
            "ambiguous value column: expected exactly 1 besides '{}', found {}",
            names[date_idx],
            others.len()
        )),
    }
}

/// Load a raw indicator file from disk.
pub fn load_raw_series(path: &Path) -> Result<RawSeries, MtmError> {
    if !path.exists() {
        return Err(MtmError::MissingSource {
            what: "raw file",
            path: path.to_path_buf(),
        });
    }
    let file = File::open(path).map_err(|e| MtmError::io("Failed to open raw CSV", path, e))?;
    read_raw_series(file, path)
}

/// Parse raw CSV content; `source` is only used for error context.
pub fn read_raw_series<R: Read>(reader: R, source: &Path) -> Result<RawSeries, MtmError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| MtmError::Schema {
            path: source.to_path_buf(),
            message: format!("failed to read CSV headers: {e}"),
        })?
        .clone();

    let columns = detect_columns(&headers.iter().collect::<Vec<_>>()).map_err(|message| MtmError::Schema {
        path: source.to_path_buf(),
        message,
    })?;

    let mut observations = Vec::new();
    let mut rows_read = 0usize;

    for result in reader.records() {
        rows_read += 1;
        // Malformed records are tolerated the same way as bad cells.
        let Ok(record) = result else { continue };
        if let Some(obs) = coerce_row(&record, &columns) {
            observations.push(obs);
        }
    }

    let rows_dropped = rows_read - observations.len();
    if rows_dropped > 0 {
        debug!(
            source = %source.display(),
            rows_read,
            rows_dropped,
            "dropped rows with unparseable date or value"
        );
    }

    Ok(RawSeries {
        observations,
        columns,
        rows_read,
        rows_dropped,
    })
}

fn coerce_row(record: &StringRecord, columns: &DetectedColumns) -> Option<Observation> {
    let date = parse_date(record.get(columns.date_idx)?)?;
    let value = parse_value(record.get(columns.value_idx)?)?;
    Some(Observation::new(date, value))
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    name.trim().trim_start_matches('\u{feff}').to_string()
}

/// Parse a date cell, or `None` if no accepted format matches.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    // ISO first. Slash-separated dates are read month-first, the way US
    // exports write them.
    const DATE_FMTS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y"];
    const DATETIME_FMTS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in DATE_FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FMTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    // Month-only stamps (`YYYY-MM`) mean the first of that month.
    NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d").ok()
}

/// Parse a numeric cell; FRED's `.` marker, blanks and non-finite values are absent.
pub fn parse_value(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed == "." || trimmed.is_empty() {
        return None;
    }
    let v = trimmed.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}
