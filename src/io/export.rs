//! Export slice results for downstream consumers.
//!
//! - CSV: `Date,Value,ChangePct` rows, easy to open in spreadsheets
//! - JSON: the whole `SliceResult` (rows, summary as plain numbers, profile),
//!   which is what the presentation/AI layer consumes

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::SliceResult;
use crate::error::MtmError;

/// Write slice rows to a CSV file.
pub fn write_slice_csv(path: &Path, result: &SliceResult) -> Result<(), MtmError> {
    let file = File::create(path).map_err(|e| MtmError::io("Failed to create export CSV", path, e))?;
    let mut writer = csv::Writer::from_writer(file);

    let to_io = |e: csv::Error| MtmError::io("Failed to write export CSV", path, e.into());

    writer.write_record(["Date", "Value", "ChangePct"]).map_err(to_io)?;
    for row in &result.rows {
        writer
            .write_record([
                row.date.format("%Y-%m-%d").to_string(),
                row.value.to_string(),
                format!("{:.4}", row.change_pct),
            ])
            .map_err(to_io)?;
    }
    writer
        .flush()
        .map_err(|e| MtmError::io("Failed to write export CSV", path, e))
}

/// Write the full slice result as pretty JSON.
pub fn write_slice_json(path: &Path, result: &SliceResult) -> Result<(), MtmError> {
    let mut file = File::create(path).map_err(|e| MtmError::io("Failed to create export JSON", path, e))?;
    serde_json::to_writer_pretty(&mut file, result)
        .map_err(|e| MtmError::io("Failed to write export JSON", path, e.into()))?;
    writeln!(file).map_err(|e| MtmError::io("Failed to write export JSON", path, e))
}
