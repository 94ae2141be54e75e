//! Temporal trimming of anomaly series.
//!
//! Backend queries are widened backwards so baselines can be computed; the
//! points before the requested start are removed here. Trimming is a filter:
//! survivors keep their relative order, and categories are never dropped,
//! even when nothing survives.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use costlens_types::{AnomalyPoint, AnomalySeriesSet};
use tracing::debug;

/// Parse an anomaly point date.
///
/// Accepts RFC 3339 timestamps (`2024-01-02T00:00:00.000Z`) and bare days
/// (`2024-01-02`, read as midnight UTC).
pub fn parse_point_date(date: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(date)
        .map(|d| d.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .map(|day| day.and_time(NaiveTime::MIN).and_utc())
        })
}

/// Midnight UTC of `day`, the cutoff for a day-granular window.
pub fn day_start(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(NaiveTime::MIN).and_utc()
}

/// Whether `point` falls strictly before `cutoff`.
///
/// A point whose date cannot be parsed is never considered earlier.
pub fn is_before_cutoff(point: &AnomalyPoint, cutoff: DateTime<Utc>) -> bool {
    match parse_point_date(&point.date) {
        Ok(date) => date < cutoff,
        Err(e) => {
            debug!(date = %point.date, error = %e, "Unparseable anomaly date, keeping point");
            false
        }
    }
}

/// Keep, for every category, exactly the points dated on or after `cutoff`.
pub fn trim_anomaly_series(series: AnomalySeriesSet, cutoff: DateTime<Utc>) -> AnomalySeriesSet {
    series
        .into_iter()
        .map(|(category, points)| {
            let kept = points
                .into_iter()
                .filter(|point| !is_before_cutoff(point, cutoff))
                .collect();
            (category, kept)
        })
        .collect()
}

/// In-place form of [`trim_anomaly_series`].
pub fn retain_from(series: &mut AnomalySeriesSet, cutoff: DateTime<Utc>) {
    for points in series.values_mut() {
        points.retain(|point| !is_before_cutoff(point, cutoff));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(s: &str) -> DateTime<Utc> {
        day_start(NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap())
    }

    fn series(entries: &[(&str, Vec<&str>)]) -> AnomalySeriesSet {
        entries
            .iter()
            .map(|(key, dates)| {
                let points = dates
                    .iter()
                    .enumerate()
                    .map(|(i, d)| AnomalyPoint::new(*d, i as f64))
                    .collect();
                (key.to_string(), points)
            })
            .collect()
    }

    fn dates(set: &AnomalySeriesSet, key: &str) -> Vec<String> {
        set[key].iter().map(|p| p.date.clone()).collect()
    }

    #[test]
    fn test_parse_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        assert_eq!(parse_point_date("2024-01-02").unwrap(), expected);
        assert_eq!(parse_point_date("2024-01-02T00:00:00.000Z").unwrap(), expected);
        assert_eq!(parse_point_date("2024-01-02T01:00:00+01:00").unwrap(), expected);
        assert!(parse_point_date("02/01/2024").is_err());
        assert!(parse_point_date("").is_err());
    }

    #[test]
    fn test_cutoff_is_inclusive() {
        let set = series(&[("AmazonEC2", vec!["2024-01-01", "2024-01-02", "2024-01-03"])]);
        let trimmed = trim_anomaly_series(set, day("2024-01-02"));
        assert_eq!(dates(&trimmed, "AmazonEC2"), vec!["2024-01-02", "2024-01-03"]);
    }

    #[test]
    fn test_consecutive_leading_points_removed() {
        let set = series(&[(
            "AmazonS3",
            vec![
                "2024-01-01T00:00:00.000Z",
                "2024-01-02T00:00:00.000Z",
                "2024-01-03T00:00:00.000Z",
                "2024-01-04T00:00:00.000Z",
                "2024-01-05T00:00:00.000Z",
            ],
        )]);
        let trimmed = trim_anomaly_series(set, day("2024-01-04"));
        assert_eq!(
            dates(&trimmed, "AmazonS3"),
            vec!["2024-01-04T00:00:00.000Z", "2024-01-05T00:00:00.000Z"]
        );
        // Payloads travel with their points.
        assert_eq!(trimmed["AmazonS3"][0].cost, 3.0);
    }

    #[test]
    fn test_emptied_category_is_kept() {
        let set = series(&[
            ("AmazonEC2", vec!["2023-12-30", "2023-12-31"]),
            ("AmazonRDS", vec![]),
            ("AWSLambda", vec!["2024-02-01"]),
        ]);
        let trimmed = trim_anomaly_series(set, day("2024-01-01"));

        assert_eq!(trimmed.len(), 3);
        assert!(trimmed["AmazonEC2"].is_empty());
        assert!(trimmed["AmazonRDS"].is_empty());
        assert_eq!(dates(&trimmed, "AWSLambda"), vec!["2024-02-01"]);
    }

    #[test]
    fn test_unparseable_dates_survive() {
        let set = series(&[("AmazonEC2", vec!["2023-12-30", "not-a-date", "2024-01-05"])]);
        let trimmed = trim_anomaly_series(set, day("2024-01-01"));
        assert_eq!(dates(&trimmed, "AmazonEC2"), vec!["not-a-date", "2024-01-05"]);
    }

    #[test]
    fn test_retain_matches_trim() {
        let set = series(&[
            ("AmazonEC2", vec!["2024-01-01", "2024-01-02", "2024-01-03"]),
            ("AmazonS3", vec!["2023-01-01", "2025-01-01"]),
        ]);
        let cutoff = day("2024-01-02");

        let mut in_place = set.clone();
        retain_from(&mut in_place, cutoff);
        assert_eq!(in_place, trim_anomaly_series(set, cutoff));
    }

    #[test]
    fn test_empty_set() {
        assert!(trim_anomaly_series(AnomalySeriesSet::new(), day("2024-01-01")).is_empty());
    }
}
