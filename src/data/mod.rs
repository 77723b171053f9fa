//! Remote data sources for raw indicator files.

pub mod fred;

pub use fred::{FetchOutcome, FredClient};
