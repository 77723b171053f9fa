//! Normalized series store (`{processed_dir}/{indicator_id}.csv`).
//!
//! Files have exactly two columns, `Date` (ISO month-end) and `Value`.
//! Writes go to a sibling temp file that is then renamed over the target, so
//! readers see either the previous version or the new one, never a partial file.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::domain::{NormalizedSeries, Observation};
use crate::error::MtmError;

const HEADER: [&str; 2] = ["Date", "Value"];

#[derive(Debug, Clone)]
pub struct SeriesStore {
    dir: PathBuf,
}

impl SeriesStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, indicator_id: &str) -> PathBuf {
        self.dir.join(format!("{indicator_id}.csv"))
    }

    pub fn exists(&self, indicator_id: &str) -> bool {
        self.path_for(indicator_id).is_file()
    }

    /// Replace the persisted series for `indicator_id`.
    pub fn save(&self, indicator_id: &str, series: &NormalizedSeries) -> Result<PathBuf, MtmError> {
        let path = self.path_for(indicator_id);
        write_atomically(&path, |file| write_series(file, series))?;
        Ok(path)
    }

    pub fn load(&self, indicator_id: &str) -> Result<NormalizedSeries, MtmError> {
        let path = self.path_for(indicator_id);
        if !path.is_file() {
            return Err(MtmError::MissingSource {
                what: "normalized series",
                path,
            });
        }
        read_series(&path)
    }
}

fn write_series(file: File, series: &NormalizedSeries) -> Result<(), String> {
    let mut writer = csv::Writer::from_writer(file);
    writer.write_record(HEADER).map_err(|e| e.to_string())?;
    for p in &series.points {
        writer
            .write_record([p.date.format("%Y-%m-%d").to_string(), p.value.to_string()])
            .map_err(|e| e.to_string())?;
    }
    writer.flush().map_err(|e| e.to_string())
}

fn read_series(path: &Path) -> Result<NormalizedSeries, MtmError> {
    let file = File::open(path).map_err(|e| MtmError::io("Failed to open normalized series", path, e))?;
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| MtmError::data(path, format!("unreadable header: {e}")))?;
    if headers.iter().collect::<Vec<_>>() != HEADER {
        return Err(MtmError::data(path, format!("expected header Date,Value, found {headers:?}")));
    }

    let mut points = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // +2: records start after the header and lines are 1-based.
        let line = idx + 2;
        let record = result.map_err(|e| MtmError::data(path, format!("line {line}: {e}")))?;
        let date = record
            .get(0)
            .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
            .ok_or_else(|| MtmError::data(path, format!("line {line}: invalid date")))?;
        let value = record
            .get(1)
            .and_then(|s| s.parse::<f64>().ok())
            .filter(|v| v.is_finite())
            .ok_or_else(|| MtmError::data(path, format!("line {line}: invalid value")))?;
        points.push(Observation::new(date, value));
    }

    points.sort_by_key(|p| p.date);
    Ok(NormalizedSeries::new(points))
}

/// Write `path` via `{path}.tmp` + rename, creating the parent directory.
pub(crate) fn write_atomically(
    path: &Path,
    write: impl FnOnce(File) -> Result<(), String>,
) -> Result<(), MtmError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| MtmError::io("Failed to create directory", parent, e))?;
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp = PathBuf::from(tmp_name);

    let file = File::create(&tmp).map_err(|e| MtmError::io("Failed to create", &tmp, e))?;
    if let Err(message) = write(file) {
        let _ = fs::remove_file(&tmp);
        return Err(MtmError::io(
            "Failed to write",
            &tmp,
            std::io::Error::other(message),
        ));
    }
    fs::rename(&tmp, path).map_err(|e| MtmError::io("Failed to replace", path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn sample() -> NormalizedSeries {
        NormalizedSeries::new(vec![
            Observation::new(d(2020, 1, 31), 110.0),
            Observation::new(d(2020, 2, 29), 105.5),
        ])
    }

    #[test]
    fn save_writes_expected_layout_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = SeriesStore::new(dir.path().join("processed"));

        let path = store.save("vix", &sample()).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "Date,Value\n2020-01-31,110\n2020-02-29,105.5\n");
        assert!(!dir.path().join("processed/vix.csv.tmp").exists());

        assert_eq!(store.load("vix").unwrap(), sample());
    }

    #[test]
    fn resave_replaces_previous_version() {
        let dir = tempfile::tempdir().unwrap();
        let store = SeriesStore::new(dir.path());
        store.save("dxy", &sample()).unwrap();
        store
            .save("dxy", &NormalizedSeries::new(vec![Observation::new(d(2021, 5, 31), 90.0)]))
            .unwrap();
        assert_eq!(store.load("dxy").unwrap().len(), 1);
    }

    #[test]
    fn missing_series_is_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let store = SeriesStore::new(dir.path());
        assert!(!store.exists("fed_funds"));
        let err = store.load("fed_funds").unwrap_err();
        assert!(matches!(err, MtmError::MissingSource { what: "normalized series", .. }));
    }

    #[test]
    fn corrupt_series_is_data_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = SeriesStore::new(dir.path());
        std::fs::write(store.path_for("bad"), "Date,Value\n2020-01-31,abc\n").unwrap();
        let err = store.load("bad").unwrap_err();
        assert!(matches!(err, MtmError::Data { ref message, .. } if message.contains("line 2")));
    }
}
