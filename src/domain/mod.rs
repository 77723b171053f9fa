//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - registry entries (`IndicatorDef`, `ProfileKind`)
//! - raw and normalized observations (`Observation`, `NormalizedSeries`)
//! - query inputs and outputs (`WindowToken`, `YearMonth`, `SliceResult`, etc.)

pub mod types;

pub use types::*;
