//! Report sink writing records as JSON.

use std::path::PathBuf;

use async_trait::async_trait;
use costlens_collector::{ReportSink, SinkError, SinkResult};
use costlens_types::{CloudAccount, ReportRecord};
use tokio::io::AsyncWriteExt;
use tracing::info;

/// Writes each imported report as a pretty-printed JSON array, to a file or
/// to stdout.
#[derive(Debug, Clone, Default)]
pub struct JsonFileSink {
    path: Option<PathBuf>,
}

impl JsonFileSink {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }
}

#[async_trait]
impl ReportSink for JsonFileSink {
    async fn import_report_records(
        &self,
        account: &CloudAccount,
        records: &[ReportRecord],
    ) -> SinkResult<()> {
        let mut body = serde_json::to_vec_pretty(records)
            .map_err(|e| SinkError::Rejected(e.to_string()))?;
        body.push(b'\n');

        match &self.path {
            Some(path) => {
                tokio::fs::write(path, &body)
                    .await
                    .map_err(|e| SinkError::Backend(format!("{}: {e}", path.display())))?;
                info!(
                    account = account.id,
                    records = records.len(),
                    path = %path.display(),
                    "Report written"
                );
            }
            None => {
                let mut stdout = tokio::io::stdout();
                stdout
                    .write_all(&body)
                    .await
                    .map_err(|e| SinkError::Backend(e.to_string()))?;
                stdout
                    .flush()
                    .await
                    .map_err(|e| SinkError::Backend(e.to_string()))?;
            }
        }
        Ok(())
    }
}
