//! Batch workflows shared by the CLI commands.
//!
//! - build: raw files -> normalized series -> catalog
//! - fetch: FRED -> raw files
//!
//! Failures are isolated per indicator: each one is recorded in the report and
//! the batch moves on.

use rayon::prelude::*;
use tracing::{info, warn};

use crate::catalog::rebuild_catalog;
use crate::config::Settings;
use crate::data::{FetchOutcome, FredClient};
use crate::domain::CatalogEntry;
use crate::error::MtmError;
use crate::io::series::SeriesStore;
use crate::normalize::{NormalizeOutcome, normalize_indicator};
use crate::registry::IndicatorRegistry;

/// Result of one batch step for one indicator.
#[derive(Debug)]
pub struct IndicatorRun<T> {
    pub indicator_id: String,
    pub result: Result<T, MtmError>,
}

/// All outputs of a `mtm build` run.
#[derive(Debug)]
pub struct BuildReport {
    pub runs: Vec<IndicatorRun<NormalizeOutcome>>,
    pub catalog: Vec<CatalogEntry>,
}

impl BuildReport {
    pub fn failures(&self) -> usize {
        self.runs.iter().filter(|r| r.result.is_err()).count()
    }
}

/// Normalize the selected indicators (all when `only` is empty), then rebuild the catalog.
pub fn run_build(settings: &Settings, registry: &IndicatorRegistry, only: &[String]) -> Result<BuildReport, MtmError> {
    let defs = registry.select(only)?;
    let store = SeriesStore::new(&settings.processed_dir);

    // Indicators share no state; `collect` keeps selection order.
    let runs: Vec<IndicatorRun<NormalizeOutcome>> = defs
        .par_iter()
        .map(|def| {
            let result = normalize_indicator(def, &settings.raw_dir, &store);
            match &result {
                Ok(out) if out.rows == 0 => {
                    warn!(indicator = %def.id, "empty after cleaning; check raw data");
                }
                Ok(out) => info!(
                    indicator = %def.id,
                    rows = out.rows,
                    frequency = %out.frequency,
                    rows_dropped = out.rows_dropped,
                    "normalized"
                ),
                Err(err) => warn!(indicator = %def.id, error = %err, "normalization failed"),
            }
            IndicatorRun {
                indicator_id: def.id.clone(),
                result,
            }
        })
        .collect();

    let catalog = rebuild_catalog(registry, &store, &settings.catalog_path)?;
    Ok(BuildReport { runs, catalog })
}

/// Download raw files for the selected indicators.
///
/// Indicators without a FRED series id yield `Ok(None)`.
pub fn run_fetch(
    client: &FredClient,
    settings: &Settings,
    registry: &IndicatorRegistry,
    only: &[String],
) -> Result<Vec<IndicatorRun<Option<FetchOutcome>>>, MtmError> {
    let defs = registry.select(only)?;
    let mut runs = Vec::with_capacity(defs.len());

    for def in defs {
        let result = if def.fred_series.is_none() {
            info!(indicator = %def.id, "no FRED series configured; skipping");
            Ok(None)
        } else {
            client.fetch_indicator(def, &settings.raw_dir).map(Some)
        };
        if let Err(err) = &result {
            warn!(indicator = %def.id, error = %err, "fetch failed");
        }
        runs.push(IndicatorRun {
            indicator_id: def.id.clone(),
            result,
        });
    }

    Ok(runs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_failing_indicator_does_not_stop_the_batch() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::rooted_at(dir.path());
        std::fs::create_dir_all(&settings.raw_dir).unwrap();
        std::fs::write(settings.raw_dir.join("vix.csv"), "DATE,VIXCLS\n2020-01-02,13.5\n2020-02-03,18.1\n").unwrap();
        // Three columns, two of them non-date: ambiguous.
        std::fs::write(settings.raw_dir.join("dxy.csv"), "date,open,close\n2020-01-02,1,2\n").unwrap();

        let registry = IndicatorRegistry::builtin();
        let only = vec!["dxy".to_string(), "vix".to_string(), "crude_oil".to_string()];
        let report = run_build(&settings, &registry, &only).unwrap();

        let ids: Vec<&str> = report.runs.iter().map(|r| r.indicator_id.as_str()).collect();
        assert_eq!(ids, vec!["dxy", "vix", "crude_oil"]);
        assert!(matches!(report.runs[0].result, Err(MtmError::Schema { .. })));
        assert_eq!(report.runs[1].result.as_ref().unwrap().rows, 2);
        assert!(matches!(report.runs[2].result, Err(MtmError::MissingSource { .. })));
        assert_eq!(report.failures(), 2);

        assert_eq!(report.catalog.len(), 1);
        assert_eq!(report.catalog[0].indicator_id, "vix");
        assert!(settings.catalog_path.exists());
    }

    #[test]
    fn unknown_indicator_in_selection_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::rooted_at(dir.path());
        let err = run_build(&settings, &IndicatorRegistry::builtin(), &["gold".to_string()]).unwrap_err();
        assert!(matches!(err, MtmError::UnknownIndicator(_)));
    }
}
