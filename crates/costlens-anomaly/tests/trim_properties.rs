//! Property tests: trimming is an order-preserving filter on `date >= cutoff`
//! that never drops a category and is idempotent.

use chrono::{Duration, NaiveDate};
use costlens_anomaly::{day_start, parse_point_date, trim_anomaly_series};
use costlens_types::{AnomalyPoint, AnomalySeriesSet};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn base_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

/// A non-decreasing series of day offsets rendered in either date format,
/// with the occasional malformed date.
fn arb_series() -> impl Strategy<Value = Vec<AnomalyPoint>> {
    prop::collection::vec((0i64..3, any::<bool>(), 0u8..20), 0..25).prop_map(|steps| {
        let mut offset = 0;
        steps
            .into_iter()
            .enumerate()
            .map(|(i, (step, long_form, noise))| {
                offset += step;
                let day = base_day() + Duration::days(offset);
                let date = if noise == 0 {
                    format!("garbage-{i}")
                } else if long_form {
                    format!("{}T00:00:00.000Z", day.format("%Y-%m-%d"))
                } else {
                    day.format("%Y-%m-%d").to_string()
                };
                AnomalyPoint::new(date, i as f64)
            })
            .collect()
    })
}

fn arb_series_set() -> impl Strategy<Value = AnomalySeriesSet> {
    prop::collection::btree_map("[A-Z][a-zA-Z0-9]{2,10}", arb_series(), 0..6)
}

fn retained(point: &AnomalyPoint, cutoff_day: NaiveDate) -> bool {
    match parse_point_date(&point.date) {
        Ok(date) => date >= day_start(cutoff_day),
        Err(_) => true,
    }
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    /// A point survives iff its date is on or after the cutoff.
    #[test]
    fn keeps_exactly_points_on_or_after_cutoff(
        set in arb_series_set(),
        cutoff_offset in 0i64..40,
    ) {
        let cutoff_day = base_day() + Duration::days(cutoff_offset);
        let trimmed = trim_anomaly_series(set.clone(), day_start(cutoff_day));

        prop_assert_eq!(
            trimmed.keys().collect::<Vec<_>>(),
            set.keys().collect::<Vec<_>>()
        );
        for (category, points) in &set {
            let expected: Vec<AnomalyPoint> = points
                .iter()
                .filter(|p| retained(p, cutoff_day))
                .cloned()
                .collect();
            prop_assert_eq!(&trimmed[category], &expected);
        }
    }

    /// Trimming twice with the same cutoff changes nothing.
    #[test]
    fn trimming_is_idempotent(
        set in arb_series_set(),
        cutoff_offset in 0i64..40,
    ) {
        let cutoff = day_start(base_day() + Duration::days(cutoff_offset));
        let once = trim_anomaly_series(set, cutoff);
        let twice = trim_anomaly_series(once.clone(), cutoff);
        prop_assert_eq!(once, twice);
    }

    /// Survivors with parseable dates stay non-decreasing.
    #[test]
    fn trimmed_dates_stay_sorted(
        set in arb_series_set(),
        cutoff_offset in 0i64..40,
    ) {
        let cutoff = day_start(base_day() + Duration::days(cutoff_offset));
        for points in trim_anomaly_series(set, cutoff).values() {
            let dates: Vec<_> = points
                .iter()
                .filter_map(|p| parse_point_date(&p.date).ok())
                .collect();
            prop_assert!(dates.windows(2).all(|w| w[0] <= w[1]));
            prop_assert!(dates.iter().all(|d| *d >= cutoff));
        }
    }
}

#[test]
fn three_day_series_cut_at_second_day() {
    let mut set = AnomalySeriesSet::new();
    set.insert(
        "AmazonEC2".into(),
        ["2024-01-01", "2024-01-02", "2024-01-03"]
            .into_iter()
            .map(|d| AnomalyPoint::new(d, 1.0))
            .collect(),
    );

    let cutoff = day_start(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
    let trimmed = trim_anomaly_series(set, cutoff);

    let dates: Vec<&str> = trimmed["AmazonEC2"].iter().map(|p| p.date.as_str()).collect();
    assert_eq!(dates, vec!["2024-01-02", "2024-01-03"]);
}
