//! Search backend seam.

use async_trait::async_trait;
use costlens_types::AnomalySeriesSet;
use tokio::sync::Mutex;

use crate::error::BackendError;
use crate::query::AnomalyQuery;

/// Executes anomaly queries and returns raw, untrimmed series.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search_anomalies(&self, query: &AnomalyQuery)
        -> Result<AnomalySeriesSet, BackendError>;
}

/// Backend answering every query with the same result.
#[derive(Debug)]
pub struct StaticBackend {
    response: Result<AnomalySeriesSet, BackendError>,
    queries: Mutex<Vec<AnomalyQuery>>,
}

impl StaticBackend {
    pub fn with_series(series: AnomalySeriesSet) -> Self {
        Self {
            response: Ok(series),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: BackendError) -> Self {
        Self {
            response: Err(error),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Queries received so far.
    pub async fn queries(&self) -> Vec<AnomalyQuery> {
        self.queries.lock().await.clone()
    }
}

#[async_trait]
impl SearchBackend for StaticBackend {
    async fn search_anomalies(
        &self,
        query: &AnomalyQuery,
    ) -> Result<AnomalySeriesSet, BackendError> {
        self.queries.lock().await.push(query.clone());
        self.response.clone()
    }
}
