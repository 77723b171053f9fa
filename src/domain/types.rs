//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - passed between the normalization, catalog and slicing stages
//! - exported to JSON/CSV for the presentation layer
//! - reloaded from the registry file

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::MtmError;

/// Which specialized statistics to compute on top of the generic summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileKind {
    /// Spread series where negative values mean inversion.
    YieldCurve,
    /// Fear-gauge style index where spikes matter more than drift.
    Volatility,
}

/// One entry of the indicator registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorDef {
    pub id: String,
    /// Raw CSV filename under the raw-data directory.
    pub file: String,
    pub country: String,
    pub category: String,
    pub display: String,
    /// FRED series id used by `mtm fetch`, when the series is available there.
    #[serde(default)]
    pub fred_series: Option<String>,
    #[serde(default)]
    pub profile: Option<ProfileKind>,
}

/// A single `(date, value)` observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

impl Observation {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// Observation spacing classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Monthly,
    Irregular,
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Frequency::Daily => "daily",
            Frequency::Monthly => "monthly",
            Frequency::Irregular => "irregular",
        };
        f.write_str(s)
    }
}

/// Series resampled to one month-end row per calendar month, ascending.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedSeries {
    pub points: Vec<Observation>,
}

impl NormalizedSeries {
    pub fn new(points: Vec<Observation>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }
}

/// One row of the discovery catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub indicator_id: String,
    pub display: String,
    pub country: String,
    pub category: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub rows: usize,
}

/// Trailing-years window token accepted by slice queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowToken {
    #[serde(rename = "1Y")]
    Y1,
    #[serde(rename = "3Y")]
    Y3,
    #[serde(rename = "5Y")]
    Y5,
    #[serde(rename = "10Y")]
    Y10,
    #[serde(rename = "20Y")]
    Y20,
    #[serde(rename = "30Y")]
    Y30,
}

impl WindowToken {
    pub const ALL: [WindowToken; 6] = [
        WindowToken::Y1,
        WindowToken::Y3,
        WindowToken::Y5,
        WindowToken::Y10,
        WindowToken::Y20,
        WindowToken::Y30,
    ];

    pub fn years(self) -> i32 {
        match self {
            WindowToken::Y1 => 1,
            WindowToken::Y3 => 3,
            WindowToken::Y5 => 5,
            WindowToken::Y10 => 10,
            WindowToken::Y20 => 20,
            WindowToken::Y30 => 30,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            WindowToken::Y1 => "1Y",
            WindowToken::Y3 => "3Y",
            WindowToken::Y5 => "5Y",
            WindowToken::Y10 => "10Y",
            WindowToken::Y20 => "20Y",
            WindowToken::Y30 => "30Y",
        }
    }
}

impl fmt::Display for WindowToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for WindowToken {
    type Err = MtmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        WindowToken::ALL
            .into_iter()
            .find(|t| t.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                MtmError::InvalidQuery(format!(
                    "unrecognized window '{s}'; expected one of 1Y, 3Y, 5Y, 10Y, 20Y, 30Y"
                ))
            })
    }
}

/// A calendar month written as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct YearMonth {
    first_day: NaiveDate,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|first_day| Self { first_day })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            first_day: first_of_month(date),
        }
    }

    pub fn first_day(self) -> NaiveDate {
        self.first_day
    }

    pub fn last_day(self) -> NaiveDate {
        end_of_month(self.first_day)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.first_day.format("%Y-%m"))
    }
}

impl FromStr for YearMonth {
    type Err = MtmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || MtmError::InvalidQuery(format!("invalid month '{s}'; expected YYYY-MM"));
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.is_empty() || month.len() > 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        YearMonth::new(year, month).ok_or_else(invalid)
    }
}

/// Inclusive date bounds a slice was resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// One slice row with its change versus the previous row, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SliceRow {
    pub date: NaiveDate,
    pub value: f64,
    pub change_pct: f64,
}

/// Whole-slice statistics, kept as plain numbers for downstream formatting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub start_value: f64,
    pub end_value: f64,
    pub abs_change: f64,
    /// `None` when the start value is exactly zero.
    pub pct_change: Option<f64>,
    pub min_value: f64,
    pub max_value: f64,
    pub avg_value: f64,
    pub rows: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolatilitySignal {
    FearSpike,
    Normal,
}

impl fmt::Display for VolatilitySignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VolatilitySignal::FearSpike => f.write_str("Fear Spike"),
            VolatilitySignal::Normal => f.write_str("Normal"),
        }
    }
}

/// Indicator-specific statistics layered on top of [`Summary`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SliceProfile {
    YieldCurve {
        most_inverted: f64,
        months_inverted: usize,
    },
    Volatility {
        max_spike: f64,
        spike_month: NaiveDate,
        average: f64,
        signal: VolatilitySignal,
    },
}

/// Rows and statistics for one bounded query against one indicator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliceResult {
    pub indicator_id: String,
    pub bounds: DateRange,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub rows: Vec<SliceRow>,
    pub summary: Summary,
    pub profile: Option<SliceProfile>,
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Last calendar day of the month containing `date`.
pub fn end_of_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|next| next.pred_opt())
        .unwrap_or(date)
}
