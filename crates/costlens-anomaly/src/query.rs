//! Parameters of an anomaly query.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AnomalyError, AnomalyResult};
use crate::trim::day_start;

/// Time window, accounts and indexes of an anomaly query.
///
/// Building the backend request body from these is left to the
/// [`SearchBackend`](crate::backend::SearchBackend) implementation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyQuery {
    pub date_begin: DateTime<Utc>,
    pub date_end: DateTime<Utc>,
    pub accounts: Vec<String>,
    pub indexes: Vec<String>,
}

impl AnomalyQuery {
    /// Query covering whole days, from the start of `begin` through
    /// `23:59:59` of `end`.
    pub fn for_days(
        begin: NaiveDate,
        end: NaiveDate,
        accounts: Vec<String>,
        indexes: Vec<String>,
    ) -> AnomalyResult<Self> {
        if begin > end {
            return Err(AnomalyError::InvalidRange { begin, end });
        }
        Ok(Self {
            date_begin: day_start(begin),
            date_end: day_start(end) + Duration::hours(23) + Duration::minutes(59) + Duration::seconds(59),
            accounts,
            indexes,
        })
    }

    /// Comma-joined index list, as sent to the backend.
    pub fn index_pattern(&self) -> String {
        self.indexes.join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_window_covers_whole_end_day() {
        let query = AnomalyQuery::for_days(
            date("2024-01-01"),
            date("2024-01-31"),
            vec!["123456789012".into()],
            vec!["123456789012-lineitems".into()],
        )
        .unwrap();

        assert_eq!(query.date_begin, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(query.date_end, Utc.with_ymd_and_hms(2024, 1, 31, 23, 59, 59).unwrap());
    }

    #[test]
    fn test_single_day_window() {
        let query = AnomalyQuery::for_days(date("2024-05-05"), date("2024-05-05"), vec![], vec![]).unwrap();
        assert!(query.date_begin < query.date_end);
    }

    #[test]
    fn test_reversed_range_rejected() {
        let err = AnomalyQuery::for_days(date("2024-02-01"), date("2024-01-01"), vec![], vec![])
            .unwrap_err();
        assert!(matches!(err, AnomalyError::InvalidRange { .. }));
    }

    #[test]
    fn test_index_pattern() {
        let query = AnomalyQuery::for_days(
            date("2024-01-01"),
            date("2024-01-02"),
            vec![],
            vec!["a-lineitems".into(), "b-lineitems".into()],
        )
        .unwrap();
        assert_eq!(query.index_pattern(), "a-lineitems,b-lineitems");
    }
}
