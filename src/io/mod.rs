//! Input/output helpers.
//!
//! - raw CSV ingest + column detection (`ingest`)
//! - normalized series persistence (`series`)
//! - slice exports (CSV/JSON) (`export`)

pub mod export;
pub mod ingest;
pub mod series;

pub use export::*;
pub use ingest::*;
pub use series::SeriesStore;
