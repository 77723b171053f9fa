//! Observation-spacing classification from the median gap between dates.

use chrono::NaiveDate;

use crate::domain::Frequency;

/// Fewer dates than this cannot be classified.
const MIN_DATES: usize = 3;
const DAILY_MAX_GAP_DAYS: f64 = 10.0;
const MONTHLY_GAP_DAYS: std::ops::RangeInclusive<f64> = 25.0..=35.0;

/// Classify a date sequence as daily, monthly or irregular.
///
/// Dates do not need to be sorted. The result is diagnostic only; resampling
/// does not branch on it.
pub fn infer_frequency(dates: &[NaiveDate]) -> Frequency {
    if dates.len() < MIN_DATES {
        return Frequency::Irregular;
    }

    let mut sorted = dates.to_vec();
    sorted.sort_unstable();

    let gaps: Vec<f64> = sorted
        .windows(2)
        .map(|w| (w[1] - w[0]).num_days() as f64)
        .collect();

    let Some(median) = median(gaps) else {
        return Frequency::Irregular;
    };

    if median <= DAILY_MAX_GAP_DAYS {
        Frequency::Daily
    } else if MONTHLY_GAP_DAYS.contains(&median) {
        Frequency::Monthly
    } else {
        Frequency::Irregular
    }
}

fn median(mut values: Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn every(start: NaiveDate, step_days: i64, n: usize) -> Vec<NaiveDate> {
        (0..n).map(|i| start + Duration::days(step_days * i as i64)).collect()
    }

    #[test]
    fn too_few_dates_is_irregular() {
        assert_eq!(infer_frequency(&[]), Frequency::Irregular);
        assert_eq!(infer_frequency(&[d(2020, 1, 1), d(2020, 1, 2)]), Frequency::Irregular);
    }

    #[test]
    fn business_days_are_daily() {
        // Weekends produce 3-day gaps; the median is still 1.
        let dates = every(d(2024, 1, 1), 1, 30)
            .into_iter()
            .filter(|dt| !matches!(dt.format("%a").to_string().as_str(), "Sat" | "Sun"))
            .collect::<Vec<_>>();
        assert_eq!(infer_frequency(&dates), Frequency::Daily);
    }

    #[test]
    fn weekly_is_daily_by_threshold() {
        assert_eq!(infer_frequency(&every(d(2024, 1, 5), 7, 10)), Frequency::Daily);
    }

    #[test]
    fn month_starts_are_monthly_even_unsorted() {
        let dates = vec![d(2020, 3, 1), d(2020, 1, 1), d(2020, 4, 1), d(2020, 2, 1)];
        assert_eq!(infer_frequency(&dates), Frequency::Monthly);
    }

    #[test]
    fn boundaries_are_inclusive() {
        assert_eq!(infer_frequency(&every(d(2020, 1, 1), 10, 5)), Frequency::Daily);
        assert_eq!(infer_frequency(&every(d(2020, 1, 1), 25, 5)), Frequency::Monthly);
        assert_eq!(infer_frequency(&every(d(2020, 1, 1), 35, 5)), Frequency::Monthly);
        assert_eq!(infer_frequency(&every(d(2020, 1, 1), 36, 5)), Frequency::Irregular);
        assert_eq!(infer_frequency(&every(d(2020, 1, 1), 11, 5)), Frequency::Irregular);
    }

    #[test]
    fn quarterly_is_irregular() {
        let dates = vec![d(2020, 1, 1), d(2020, 4, 1), d(2020, 7, 1), d(2020, 10, 1)];
        assert_eq!(infer_frequency(&dates), Frequency::Irregular);
    }

    #[test]
    fn even_gap_count_uses_midpoint_median() {
        // Gaps 1, 1, 40, 40 -> median 20.5 -> irregular.
        let dates = vec![d(2020, 1, 1), d(2020, 1, 2), d(2020, 1, 3), d(2020, 2, 12), d(2020, 3, 23)];
        assert_eq!(infer_frequency(&dates), Frequency::Irregular);
    }
}
