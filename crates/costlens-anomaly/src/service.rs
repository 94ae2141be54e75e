//! Anomaly retrieval: query the backend, classify failures, trim the offset.

use std::sync::Arc;

use costlens_types::AnomalySeriesSet;
use serde::Serialize;
use tracing::{error, instrument, warn};

use crate::backend::SearchBackend;
use crate::error::{AnomalyError, AnomalyResult, BackendError};
use crate::query::AnomalyQuery;
use crate::trim::trim_anomaly_series;

/// Anomalies returned to a caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalyResponse {
    /// `false` when the backend has no index for the query yet.
    pub indexed: bool,
    pub series: AnomalySeriesSet,
}

impl AnomalyResponse {
    pub fn not_indexed() -> Self {
        Self {
            indexed: false,
            series: AnomalySeriesSet::new(),
        }
    }
}

/// Serves cost anomalies from a [`SearchBackend`].
pub struct AnomalyService {
    backend: Arc<dyn SearchBackend>,
}

impl AnomalyService {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self { backend }
    }

    /// Fetch anomalies for `query`, trimmed to `query.date_begin`.
    ///
    /// A missing index is a soft result (empty, `indexed = false`); any other
    /// backend failure is returned as an error.
    #[instrument(skip(self, query), fields(index = %query.index_pattern()))]
    pub async fn get_anomalies(&self, query: &AnomalyQuery) -> AnomalyResult<AnomalyResponse> {
        match self.backend.search_anomalies(query).await {
            Ok(series) => Ok(AnomalyResponse {
                indexed: true,
                series: trim_anomaly_series(series, query.date_begin),
            }),
            Err(e) if e.is_not_ready() => {
                warn!(error = %e, "Query execution failed, index does not exist");
                Ok(AnomalyResponse::not_indexed())
            }
            Err(e @ BackendError::SearchPhase { .. }) => {
                error!(error = %e, "Error while getting data from search backend");
                Err(AnomalyError::Backend(e))
            }
            Err(e) => {
                error!(error = %e, "Query execution failed");
                Err(AnomalyError::Backend(e))
            }
        }
    }
}
