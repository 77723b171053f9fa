//! FRED API integration: download raw indicator files.
//!
//! Downloads are written in the shape of FRED's own CSV export
//! (`observation_date,<SERIES_ID>`), including FRED's `.` missing-value marker,
//! so fetched files go through exactly the same ingest path as hand-exported ones.

use std::path::{Path, PathBuf};

use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::domain::IndicatorDef;
use crate::error::MtmError;
use crate::io::series::write_atomically;

const BASE_URL: &str = "https://api.stlouisfed.org/fred/series/observations";
const OBS_LIMIT: usize = 100_000;

pub struct FredClient {
    client: Client,
    api_key: String,
}

impl FredClient {
    pub fn from_env() -> Result<Self, MtmError> {
        dotenvy::dotenv().ok();
        let api_key = std::env::var("FRED_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| MtmError::Fetch("Missing FRED_API_KEY in environment (.env).".to_string()))?;
        Ok(Self {
            client: Client::new(),
            api_key,
        })
    }

    /// Fetch all observations of `series_id` in ascending date order.
    pub fn fetch_observations(&self, series_id: &str) -> Result<Vec<RawObservation>, MtmError> {
        let resp = self
            .client
            .get(BASE_URL)
            .query(&[
                ("series_id", series_id),
                ("api_key", &self.api_key),
                ("file_type", "json"),
                ("sort_order", "asc"),
                ("limit", &OBS_LIMIT.to_string()),
            ])
            .send()
            .map_err(|e| MtmError::Fetch(format!("FRED request for {series_id} failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(MtmError::Fetch(format!(
                "FRED request for {series_id} failed with status {}.",
                resp.status()
            )));
        }

        let body: ObservationsResponse = resp
            .json()
            .map_err(|e| MtmError::Fetch(format!("Failed to parse FRED response for {series_id}: {e}")))?;
        debug!(series_id, observations = body.observations.len(), "FRED response received");
        Ok(body.observations)
    }

    /// Download the indicator's series into its raw file under `raw_dir`.
    pub fn fetch_indicator(&self, def: &IndicatorDef, raw_dir: &Path) -> Result<FetchOutcome, MtmError> {
        let series_id = def
            .fred_series
            .as_deref()
            .ok_or_else(|| MtmError::Fetch(format!("indicator '{}' has no FRED series id", def.id)))?;

        let observations = self.fetch_observations(series_id)?;
        let path = raw_dir.join(&def.file);
        write_fred_csv(&path, series_id, &observations)?;
        info!(indicator = %def.id, series_id, rows = observations.len(), path = %path.display(), "raw file written");

        Ok(FetchOutcome {
            indicator_id: def.id.clone(),
            series_id: series_id.to_string(),
            rows: observations.len(),
            path,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    pub indicator_id: String,
    pub series_id: String,
    pub rows: usize,
    pub path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    observations: Vec<RawObservation>,
}

/// One FRED observation, kept as text exactly as served.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawObservation {
    pub date: String,
    pub value: String,
}

/// Write observations as a FRED-style two-column CSV.
pub fn write_fred_csv(path: &Path, series_id: &str, observations: &[RawObservation]) -> Result<(), MtmError> {
    write_atomically(path, |file| {
        let mut writer = csv::Writer::from_writer(file);
        writer
            .write_record(["observation_date", series_id])
            .map_err(|e| e.to_string())?;
        for obs in observations {
            writer
                .write_record([obs.date.as_str(), obs.value.as_str()])
                .map_err(|e| e.to_string())?;
        }
        writer.flush().map_err(|e| e.to_string())
    })
}
