//! Window slicing over normalized series.
//!
//! A query names an indicator plus either a trailing-years token or an
//! explicit month range. The slicer resolves that to inclusive date bounds,
//! extracts the rows, and attaches per-row change and summary statistics.
//! Nothing here writes to disk.

use chrono::{Datelike, NaiveDate};

use crate::domain::{
    DateRange, NormalizedSeries, ProfileKind, SliceResult, WindowToken, YearMonth,
};
use crate::error::MtmError;
use crate::io::series::SeriesStore;
use crate::registry::IndicatorRegistry;

pub mod stats;

/// How a query bounds its slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryWindow {
    /// Trailing window anchored at the last available date.
    Relative(WindowToken),
    /// Month range; an omitted side defaults to the series' first/last date.
    Explicit {
        start: Option<YearMonth>,
        end: Option<YearMonth>,
    },
}

impl QueryWindow {
    /// Validate raw query fields. Blank strings count as omitted.
    pub fn from_parts(window: Option<&str>, start: Option<&str>, end: Option<&str>) -> Result<Self, MtmError> {
        fn present(s: Option<&str>) -> Option<&str> {
            s.map(str::trim).filter(|s| !s.is_empty())
        }
        let (window, start, end) = (present(window), present(start), present(end));

        match window {
            Some(_) if start.is_some() || end.is_some() => Err(MtmError::InvalidQuery(
                "use either a window or a start/end range, not both".to_string(),
            )),
            Some(token) => Ok(QueryWindow::Relative(token.parse::<WindowToken>()?)),
            None => Ok(QueryWindow::Explicit {
                start: start.map(str::parse::<YearMonth>).transpose()?,
                end: end.map(str::parse::<YearMonth>).transpose()?,
            }),
        }
    }

    /// Inclusive bounds for `series`, or `None` when the series is empty.
    pub fn resolve(&self, series: &NormalizedSeries) -> Option<DateRange> {
        let first = series.first_date()?;
        let last = series.last_date()?;

        match *self {
            QueryWindow::Relative(token) => Some(DateRange {
                start: years_before_month_start(last, token.years()),
                end: last,
            }),
            QueryWindow::Explicit { start, end } => Some(DateRange {
                start: start.map_or(first, YearMonth::first_day),
                // The whole end month is included.
                end: end.map_or(last, YearMonth::last_day),
            }),
        }
    }
}

/// First day of `anchor`'s month, `years` earlier.
fn years_before_month_start(anchor: NaiveDate, years: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(anchor.year() - years, anchor.month(), 1).unwrap_or(anchor)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliceQuery {
    pub indicator_id: String,
    pub window: QueryWindow,
}

impl SliceQuery {
    pub fn new(indicator_id: impl Into<String>, window: QueryWindow) -> Self {
        Self {
            indicator_id: indicator_id.into(),
            window,
        }
    }
}

/// Slice a series already in memory.
pub fn slice_series(
    indicator_id: &str,
    series: &NormalizedSeries,
    window: &QueryWindow,
    profile: Option<ProfileKind>,
) -> Result<SliceResult, MtmError> {
    let empty = || MtmError::EmptySlice {
        indicator_id: indicator_id.to_string(),
    };

    let bounds = window.resolve(series).ok_or_else(empty)?;
    let mut points: Vec<_> = series
        .points
        .iter()
        .copied()
        .filter(|p| bounds.contains(p.date))
        .collect();
    points.sort_by_key(|p| p.date);

    let summary = stats::summarize(&points).ok_or_else(empty)?;
    let rows = stats::with_period_change(&points);
    let (start_date, end_date) = match (rows.first(), rows.last()) {
        (Some(first), Some(last)) => (first.date, last.date),
        _ => return Err(empty()),
    };

    Ok(SliceResult {
        indicator_id: indicator_id.to_string(),
        bounds,
        start_date,
        end_date,
        profile: profile.and_then(|kind| stats::profile(kind, &points)),
        rows,
        summary,
    })
}

/// Load the indicator's normalized series and slice it.
///
/// The registry is only consulted for the optional profile; an id missing from
/// it can still be sliced if its series file exists.
pub fn slice_indicator(
    store: &SeriesStore,
    registry: &IndicatorRegistry,
    query: &SliceQuery,
) -> Result<SliceResult, MtmError> {
    let series = store.load(&query.indicator_id)?;
    let profile = registry.get(&query.indicator_id).and_then(|d| d.profile);
    slice_series(&query.indicator_id, &series, &query.window, profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Observation, SliceProfile, end_of_month};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    /// Month-end series from `(y, m)` for `n` months with values 1, 2, 3...
    fn monthly(y: i32, m: u32, n: usize) -> NormalizedSeries {
        let mut date = d(y, m, 1);
        let mut points = Vec::with_capacity(n);
        for i in 0..n {
            let eom = end_of_month(date);
            points.push(Observation::new(eom, (i + 1) as f64));
            date = eom.succ_opt().unwrap();
        }
        NormalizedSeries::new(points)
    }

    fn explicit(start: &str, end: &str) -> QueryWindow {
        QueryWindow::from_parts(None, Some(start), Some(end)).unwrap()
    }

    #[test]
    fn window_and_range_together_is_invalid() {
        let err = QueryWindow::from_parts(Some("5Y"), Some("2020-01"), None).unwrap_err();
        assert!(matches!(err, MtmError::InvalidQuery(_)));
        let err = QueryWindow::from_parts(Some("1Y"), None, Some("2020-01")).unwrap_err();
        assert!(matches!(err, MtmError::InvalidQuery(_)));
    }

    #[test]
    fn unknown_token_and_bad_month_are_invalid() {
        assert!(matches!(
            QueryWindow::from_parts(Some("7Y"), None, None),
            Err(MtmError::InvalidQuery(_))
        ));
        assert!(matches!(
            QueryWindow::from_parts(None, Some("2020/01"), None),
            Err(MtmError::InvalidQuery(_))
        ));
    }

    #[test]
    fn blank_fields_count_as_omitted() {
        let w = QueryWindow::from_parts(Some("3Y"), Some(""), Some("  ")).unwrap();
        assert_eq!(w, QueryWindow::Relative(WindowToken::Y3));
        let w = QueryWindow::from_parts(None, None, None).unwrap();
        assert_eq!(w, QueryWindow::Explicit { start: None, end: None });
        let w = QueryWindow::from_parts(Some(" "), Some(" 2020-01 "), None).unwrap();
        assert_eq!(
            w,
            QueryWindow::Explicit {
                start: Some("2020-01".parse().unwrap()),
                end: None
            }
        );
    }

    #[test]
    fn one_year_window_is_anchored_at_last_date() {
        // Jan 2022 .. Jun 2024.
        let series = monthly(2022, 1, 30);
        assert_eq!(series.last_date(), Some(d(2024, 6, 30)));

        let result = slice_series("x", &series, &QueryWindow::Relative(WindowToken::Y1), None).unwrap();
        assert_eq!(result.bounds, DateRange { start: d(2023, 6, 1), end: d(2024, 6, 30) });
        assert_eq!(result.start_date, d(2023, 6, 30));
        assert_eq!(result.end_date, d(2024, 6, 30));
        assert_eq!(result.rows.len(), 13);
        assert!(result.rows.iter().all(|r| result.bounds.contains(r.date)));
    }

    #[test]
    fn window_longer_than_history_returns_everything() {
        let series = monthly(2022, 1, 30);
        let result = slice_series("x", &series, &QueryWindow::Relative(WindowToken::Y30), None).unwrap();
        assert_eq!(result.rows.len(), 30);
    }

    #[test]
    fn explicit_range_includes_whole_end_month() {
        let series = monthly(2020, 1, 4);
        let result = slice_series("x", &series, &explicit("2020-01", "2020-03"), None).unwrap();
        let dates: Vec<NaiveDate> = result.rows.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![d(2020, 1, 31), d(2020, 2, 29), d(2020, 3, 31)]);
        assert_eq!(result.summary.start_value, 1.0);
        assert_eq!(result.summary.end_value, 3.0);
        assert_eq!(result.rows[0].change_pct, 0.0);
    }

    #[test]
    fn open_ended_ranges_default_to_series_bounds() {
        let series = monthly(2020, 1, 4);
        let from = QueryWindow::from_parts(None, Some("2020-03"), None).unwrap();
        assert_eq!(slice_series("x", &series, &from, None).unwrap().rows.len(), 2);

        let to = QueryWindow::from_parts(None, None, Some("2020-01")).unwrap();
        let result = slice_series("x", &series, &to, None).unwrap();
        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.bounds.start, d(2020, 1, 31));
    }

    #[test]
    fn empty_range_is_an_error() {
        let series = monthly(2020, 1, 4);
        let err = slice_series("cpi", &series, &explicit("2021-01", "2021-12"), None).unwrap_err();
        assert!(matches!(err, MtmError::EmptySlice { indicator_id } if indicator_id == "cpi"));

        // Start after end cannot match anything either.
        let err = slice_series("cpi", &series, &explicit("2020-03", "2020-01"), None).unwrap_err();
        assert!(matches!(err, MtmError::EmptySlice { .. }));

        let err = slice_series("cpi", &NormalizedSeries::default(), &explicit("2020-01", "2020-02"), None)
            .unwrap_err();
        assert!(matches!(err, MtmError::EmptySlice { .. }));
    }

    #[test]
    fn profile_is_attached_when_requested() {
        let series = monthly(2020, 1, 4);
        let window = explicit("2020-01", "2020-04");
        let result = slice_series("t10y2y", &series, &window, Some(ProfileKind::YieldCurve)).unwrap();
        assert_eq!(
            result.profile,
            Some(SliceProfile::YieldCurve {
                most_inverted: 1.0,
                months_inverted: 0
            })
        );
    }

    #[test]
    fn slice_indicator_reports_missing_series() {
        let dir = tempfile::tempdir().unwrap();
        let store = SeriesStore::new(dir.path());
        let query = SliceQuery::new("fed_funds", QueryWindow::Relative(WindowToken::Y5));
        let err = slice_indicator(&store, &IndicatorRegistry::builtin(), &query).unwrap_err();
        assert!(matches!(err, MtmError::MissingSource { .. }));
    }
}
