use chrono::NaiveDate;
use thiserror::Error;

/// Failure reported by a [`SearchBackend`](crate::backend::SearchBackend).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The queried index has not been created yet.
    #[error("index {index} does not exist")]
    IndexNotFound { index: String },

    #[error("search phase execution failed: {reason}")]
    SearchPhase { reason: String },

    #[error("query execution failed: {0}")]
    Execution(String),
}

impl BackendError {
    /// Whether the failure means "no data yet" rather than a broken query.
    pub fn is_not_ready(&self) -> bool {
        matches!(self, BackendError::IndexNotFound { .. })
    }
}

/// Errors returned to callers of the anomaly service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnomalyError {
    #[error("anomaly query failed: {0}")]
    Backend(#[from] BackendError),

    #[error("invalid date range: {begin} is after {end}")]
    InvalidRange { begin: NaiveDate, end: NaiveDate },
}

pub type AnomalyResult<T> = Result<T, AnomalyError>;
