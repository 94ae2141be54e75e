//! Persistence seam for assembled reports.

use std::collections::HashMap;

use async_trait::async_trait;
use costlens_types::{CloudAccount, ReportRecord};
use tokio::sync::RwLock;

use crate::error::{SinkError, SinkResult};

/// Destination for a run's report records.
///
/// The collection core hands over the whole assembled list once per run and
/// has no knowledge of how or where it is stored.
#[async_trait]
pub trait ReportSink: Send + Sync {
    async fn import_report_records(
        &self,
        account: &CloudAccount,
        records: &[ReportRecord],
    ) -> SinkResult<()>;
}

/// In-memory sink for development and testing.
#[derive(Debug, Default)]
pub struct MemorySink {
    imports: RwLock<HashMap<u64, Vec<Vec<ReportRecord>>>>,
    failure: Option<SinkError>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that rejects every import with `error`.
    pub fn failing(error: SinkError) -> Self {
        Self {
            imports: RwLock::new(HashMap::new()),
            failure: Some(error),
        }
    }

    /// Total number of imports accepted, across accounts.
    pub async fn import_count(&self) -> usize {
        let imports = self.imports.read().await;
        imports.values().map(Vec::len).sum()
    }

    /// Records of the latest import for an account.
    pub async fn latest(&self, account_id: u64) -> Option<Vec<ReportRecord>> {
        let imports = self.imports.read().await;
        imports.get(&account_id).and_then(|runs| runs.last().cloned())
    }
}

#[async_trait]
impl ReportSink for MemorySink {
    async fn import_report_records(
        &self,
        account: &CloudAccount,
        records: &[ReportRecord],
    ) -> SinkResult<()> {
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        let mut imports = self.imports.write().await;
        imports
            .entry(account.id)
            .or_default()
            .push(records.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use costlens_types::{AccountId, Region, ReportKind, ResourceRecord};

    fn report(id: &str) -> ReportRecord {
        ReportRecord {
            account: AccountId::new("123"),
            report_date: Utc::now(),
            report_type: ReportKind::Daily,
            instance: ResourceRecord::new(id, &Region::from("us-east-1"), "m5.large"),
        }
    }

    #[tokio::test]
    async fn test_imports_are_kept_per_account() {
        let sink = MemorySink::new();
        let account = CloudAccount::new(7, "arn", "ext");

        sink.import_report_records(&account, &[report("a")])
            .await
            .unwrap();
        sink.import_report_records(&account, &[report("b"), report("c")])
            .await
            .unwrap();

        assert_eq!(sink.import_count().await, 2);
        let latest = sink.latest(7).await.unwrap();
        assert_eq!(latest.len(), 2);
        assert!(sink.latest(8).await.is_none());
    }

    #[tokio::test]
    async fn test_failing_sink() {
        let sink = MemorySink::failing(SinkError::Backend("unavailable".into()));
        let account = CloudAccount::new(7, "arn", "ext");

        let result = sink.import_report_records(&account, &[report("a")]).await;
        assert_eq!(result, Err(SinkError::Backend("unavailable".into())));
        assert_eq!(sink.import_count().await, 0);
    }
}
