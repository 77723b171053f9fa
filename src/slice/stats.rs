//! Per-row change, whole-slice summary, and indicator profiles.

use crate::domain::{Observation, ProfileKind, SliceProfile, SliceRow, Summary, VolatilitySignal};

/// VIX level above which a window is flagged as containing a fear spike.
const FEAR_SPIKE_LEVEL: f64 = 40.0;

/// Attach the percent change versus the previous row.
///
/// The first row is exactly zero, and so is any row whose change is not finite
/// (previous value zero).
pub fn with_period_change(points: &[Observation]) -> Vec<SliceRow> {
    let mut prev: Option<f64> = None;
    points
        .iter()
        .map(|p| {
            let change_pct = match prev {
                Some(prev) => {
                    let pct = (p.value - prev) / prev * 100.0;
                    if pct.is_finite() { pct } else { 0.0 }
                }
                None => 0.0,
            };
            prev = Some(p.value);
            SliceRow {
                date: p.date,
                value: p.value,
                change_pct,
            }
        })
        .collect()
}

/// Summarize a non-empty slice; `None` for an empty one.
pub fn summarize(points: &[Observation]) -> Option<Summary> {
    let first = points.first()?;
    let last = points.last()?;

    let mut min_value = f64::INFINITY;
    let mut max_value = f64::NEG_INFINITY;
    let mut sum = 0.0;
    for p in points {
        min_value = min_value.min(p.value);
        max_value = max_value.max(p.value);
        sum += p.value;
    }

    let abs_change = last.value - first.value;
    // Undefined rather than zero: a 0 → x move has no meaningful percentage.
    let pct_change = (first.value != 0.0).then(|| abs_change / first.value * 100.0);

    Some(Summary {
        start_value: first.value,
        end_value: last.value,
        abs_change,
        pct_change,
        min_value,
        max_value,
        avg_value: sum / points.len() as f64,
        rows: points.len(),
    })
}

/// Indicator-specific statistics for a non-empty slice.
pub fn profile(kind: ProfileKind, points: &[Observation]) -> Option<SliceProfile> {
    if points.is_empty() {
        return None;
    }
    match kind {
        ProfileKind::YieldCurve => Some(SliceProfile::YieldCurve {
            most_inverted: points.iter().map(|p| p.value).fold(f64::INFINITY, f64::min),
            months_inverted: points.iter().filter(|p| p.value < 0.0).count(),
        }),
        ProfileKind::Volatility => {
            // First occurrence of the maximum.
            let peak = points
                .iter()
                .copied()
                .reduce(|best, p| if p.value > best.value { p } else { best })?;
            let average = points.iter().map(|p| p.value).sum::<f64>() / points.len() as f64;
            let signal = if peak.value > FEAR_SPIKE_LEVEL {
                VolatilitySignal::FearSpike
            } else {
                VolatilitySignal::Normal
            };
            Some(SliceProfile::Volatility {
                max_spike: peak.value,
                spike_month: peak.date,
                average,
                signal,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn pts(values: &[f64]) -> Vec<Observation> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                let date = NaiveDate::from_ymd_opt(2020, i as u32 + 1, 1).unwrap();
                Observation::new(crate::domain::end_of_month(date), v)
            })
            .collect()
    }

    #[test]
    fn first_row_change_is_exactly_zero() {
        let rows = with_period_change(&pts(&[50.0, 55.0, 44.0]));
        assert_eq!(rows[0].change_pct, 0.0);
        assert!((rows[1].change_pct - 10.0).abs() < 1e-12);
        assert!((rows[2].change_pct + 20.0).abs() < 1e-12);
    }

    #[test]
    fn zero_previous_value_forces_zero_change() {
        let rows = with_period_change(&pts(&[50.0, 0.0, 60.0, 0.0, 0.0]));
        let changes: Vec<f64> = rows.iter().map(|r| r.change_pct).collect();
        // 50 -> 0 is a genuine -100%; 0 -> 60 and 0 -> 0 are undefined and forced to 0.
        assert_eq!(changes, vec![0.0, -100.0, 0.0, -100.0, 0.0]);
        assert!(changes.iter().all(|c| c.is_finite()));
    }

    #[test]
    fn summary_statistics() {
        let s = summarize(&pts(&[2.0, 4.0, 1.0, 5.0])).unwrap();
        assert_eq!(s.start_value, 2.0);
        assert_eq!(s.end_value, 5.0);
        assert_eq!(s.abs_change, 3.0);
        assert!((s.pct_change.unwrap() - 150.0).abs() < 1e-12);
        assert_eq!(s.min_value, 1.0);
        assert_eq!(s.max_value, 5.0);
        assert!((s.avg_value - 3.0).abs() < 1e-12);
        assert_eq!(s.rows, 4);
    }

    #[test]
    fn zero_start_value_leaves_percent_change_undefined() {
        let s = summarize(&pts(&[0.0, 1.5])).unwrap();
        assert_eq!(s.abs_change, 1.5);
        assert_eq!(s.pct_change, None);
        assert!(summarize(&[]).is_none());
    }

    #[test]
    fn yield_curve_profile_counts_inverted_months() {
        let p = profile(ProfileKind::YieldCurve, &pts(&[0.5, -0.2, -0.9, 0.1])).unwrap();
        assert_eq!(
            p,
            SliceProfile::YieldCurve {
                most_inverted: -0.9,
                months_inverted: 2
            }
        );
    }

    #[test]
    fn volatility_profile_flags_spikes() {
        let points = pts(&[18.0, 53.5, 30.0, 53.5]);
        let Some(SliceProfile::Volatility {
            max_spike,
            spike_month,
            average,
            signal,
        }) = profile(ProfileKind::Volatility, &points)
        else {
            panic!("expected volatility profile");
        };
        assert_eq!(max_spike, 53.5);
        assert_eq!(spike_month, points[1].date);
        assert!((average - 38.75).abs() < 1e-12);
        assert_eq!(signal, VolatilitySignal::FearSpike);

        let calm = profile(ProfileKind::Volatility, &pts(&[12.0, 40.0])).unwrap();
        assert!(matches!(calm, SliceProfile::Volatility { signal: VolatilitySignal::Normal, .. }));
    }
}
