//! Raw file → normalized monthly series.
//!
//! - frequency inference (`frequency`), used for diagnostics
//! - month-end resampling (`monthly`)
//! - the per-indicator step that loads, resamples and persists

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::debug;

use crate::domain::{Frequency, IndicatorDef};
use crate::error::MtmError;
use crate::io::ingest::load_raw_series;
use crate::io::series::SeriesStore;

pub mod frequency;
pub mod monthly;

pub use frequency::infer_frequency;
pub use monthly::resample_month_end;

/// What one normalization run produced for an indicator.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizeOutcome {
    pub indicator_id: String,
    pub frequency: Frequency,
    pub rows_read: usize,
    pub rows_dropped: usize,
    pub rows: usize,
    pub first: Option<NaiveDate>,
    pub last: Option<NaiveDate>,
    pub path: PathBuf,
}

/// Load the raw file for `def`, resample it, and replace its normalized series.
///
/// An empty result is still written; it is the caller's call whether to warn.
pub fn normalize_indicator(
    def: &IndicatorDef,
    raw_dir: &Path,
    store: &SeriesStore,
) -> Result<NormalizeOutcome, MtmError> {
    let raw = load_raw_series(&raw_dir.join(&def.file))?;

    let dates: Vec<NaiveDate> = raw.observations.iter().map(|o| o.date).collect();
    let frequency = infer_frequency(&dates);
    debug!(indicator = %def.id, %frequency, observations = dates.len(), "inferred raw frequency");

    let series = resample_month_end(&raw.observations);
    let path = store.save(&def.id, &series)?;

    Ok(NormalizeOutcome {
        indicator_id: def.id.clone(),
        frequency,
        rows_read: raw.rows_read,
        rows_dropped: raw.rows_dropped,
        rows: series.len(),
        first: series.first_date(),
        last: series.last_date(),
        path,
    })
}
