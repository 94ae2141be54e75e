//! Per-region collection.
//!
//! A [`RegionCollector`] pages through one region's reserved resources and
//! streams them into its own channel. The channel closes when the collector
//! returns, on every exit path, because the collector owns the only sender.
//! The way the stream ended is reported in the returned [`RegionOutcome`].

use std::sync::Arc;

use costlens_types::{Credentials, Region, ResourceRecord};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::ProviderError;
use crate::provider::ProviderClient;

/// How a region's stream ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionStatus {
    /// Every page was listed and forwarded.
    Completed,
    /// The provider call failed; the stream may be partial.
    Failed(ProviderError),
    /// The run was cancelled.
    Cancelled,
    /// The consumer went away before the listing finished.
    Abandoned,
}

/// Result of one region's collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionOutcome {
    pub region: Region,
    /// Records handed to the output channel before the stream closed.
    pub records_emitted: usize,
    pub status: RegionStatus,
}

impl RegionOutcome {
    pub fn is_success(&self) -> bool {
        self.status == RegionStatus::Completed
    }

    /// The failure of this region, if the provider failed it.
    pub fn failure(&self) -> Option<RegionFailure> {
        match &self.status {
            RegionStatus::Failed(error) => Some(RegionFailure {
                region: self.region.clone(),
                records_emitted: self.records_emitted,
                error: error.to_string(),
            }),
            _ => None,
        }
    }
}

/// A region whose provider listing failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionFailure {
    pub region: Region,
    pub records_emitted: usize,
    pub error: String,
}

impl std::fmt::Display for RegionFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (after {} records): {}",
            self.region, self.records_emitted, self.error
        )
    }
}

/// Collects reserved resources for a single region.
pub struct RegionCollector {
    region: Region,
    provider: Arc<dyn ProviderClient>,
    credentials: Arc<Credentials>,
}

impl RegionCollector {
    pub fn new(
        region: Region,
        provider: Arc<dyn ProviderClient>,
        credentials: Arc<Credentials>,
    ) -> Self {
        Self {
            region,
            provider,
            credentials,
        }
    }

    /// Stream the region's records into `output` until the listing ends,
    /// fails, or `cancel` fires.
    pub async fn run(
        self,
        output: mpsc::Sender<ResourceRecord>,
        cancel: CancellationToken,
    ) -> RegionOutcome {
        let mut emitted = 0;
        let mut page_token: Option<String> = None;

        loop {
            let page = tokio::select! {
                biased;
                _ = cancel.cancelled() => return self.finish(emitted, RegionStatus::Cancelled),
                page = self.provider.list_reserved_resources(
                    &self.region,
                    &self.credentials,
                    page_token.as_deref(),
                ) => page,
            };

            let page = match page {
                Ok(page) => page,
                Err(error) => {
                    warn!(
                        region = %self.region,
                        records = emitted,
                        error = %error,
                        "Error when describing reserved resources"
                    );
                    return self.finish(emitted, RegionStatus::Failed(error));
                }
            };

            for record in page.records {
                debug!(region = %self.region, id = %record.id, "Reserved resource");
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return self.finish(emitted, RegionStatus::Cancelled),
                    sent = output.send(record) => {
                        if sent.is_err() {
                            return self.finish(emitted, RegionStatus::Abandoned);
                        }
                    }
                }
                emitted += 1;
            }

            match page.next_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        self.finish(emitted, RegionStatus::Completed)
    }

    fn finish(&self, records_emitted: usize, status: RegionStatus) -> RegionOutcome {
        debug!(
            region = %self.region,
            records = records_emitted,
            status = ?status,
            "Region collector finished"
        );
        RegionOutcome {
            region: self.region.clone(),
            records_emitted,
            status,
        }
    }
}
