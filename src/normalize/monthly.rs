//! Month-end resampling.

use crate::domain::{NormalizedSeries, Observation, YearMonth, end_of_month};

/// Resample to one row per calendar month, stamped at month end.
///
/// Each month keeps its **last** observation by date (the period's closing
/// value). Sorting is stable, so among rows sharing a date the later one in
/// input order wins. The same rule applies whatever the input frequency:
/// daily data collapses to month-end closes and monthly data is re-stamped.
pub fn resample_month_end(observations: &[Observation]) -> NormalizedSeries {
    let mut sorted = observations.to_vec();
    sorted.sort_by_key(|o| o.date);

    let mut points: Vec<Observation> = Vec::new();
    for obs in sorted {
        let stamped = Observation::new(end_of_month(obs.date), obs.value);
        match points.last_mut() {
            Some(last) if YearMonth::of(last.date) == YearMonth::of(obs.date) => *last = stamped,
            _ => points.push(stamped),
        }
    }

    // Raw loading already drops absent values; non-finite ones would be the
    // only way an absent value survives to here.
    points.retain(|p| p.value.is_finite());
    NormalizedSeries::new(points)
}
