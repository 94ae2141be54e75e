//! Daily collection runs.
//!
//! A run goes through three stages:
//!
//! 1. **Discover**: assume the account role, resolve the provider account id
//!    and list regions. Any failure here aborts before a collector starts.
//! 2. **Collect**: one [`RegionCollector`] task per region, merged through a
//!    [`FanIn`] and stamped by a [`ReportAssembler`]. Region failures are
//!    gathered, not fatal.
//! 3. **Finalize**: hand the records to the [`ReportSink`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use costlens_types::{AccountId, CloudAccount, Credentials, Region, ReportKind, ReportRecord};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::assembler::ReportAssembler;
use crate::collector::{RegionCollector, RegionFailure, RegionOutcome, RegionStatus};
use crate::config::CollectorConfig;
use crate::error::{CollectError, CollectResult, DiscoveryStep, ProviderError};
use crate::merge::FanIn;
use crate::provider::ProviderClient;
use crate::sink::ReportSink;

/// Stage of a collection run, used in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Discover,
    Collect,
    Finalize,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Discover => write!(f, "discover"),
            Stage::Collect => write!(f, "collect"),
            Stage::Finalize => write!(f, "finalize"),
        }
    }
}

/// Result of the discover stage.
#[derive(Debug, Clone)]
pub struct Discovery {
    pub credentials: Arc<Credentials>,
    pub account_id: AccountId,
    pub regions: Vec<Region>,
}

/// Assembled report of one run, possibly partial.
#[derive(Debug, Clone)]
pub struct DailyReport {
    pub run_id: Uuid,
    pub account_id: AccountId,
    pub report_date: DateTime<Utc>,
    pub kind: ReportKind,
    pub records: Vec<ReportRecord>,
    /// One outcome per discovered region, sorted by region.
    pub regions: Vec<RegionOutcome>,
}

impl DailyReport {
    pub fn failures(&self) -> Vec<RegionFailure> {
        self.regions.iter().filter_map(RegionOutcome::failure).collect()
    }

    /// Whether at least one region failed.
    pub fn is_partial(&self) -> bool {
        self.regions
            .iter()
            .any(|outcome| matches!(outcome.status, RegionStatus::Failed(_)))
    }
}

/// Outcome of [`CollectionOrchestrator::collect_daily_report`].
#[derive(Debug, Clone)]
pub struct CollectionOutcome {
    pub report: DailyReport,
    /// Whether the records were handed to the sink.
    pub persisted: bool,
}

impl CollectionOutcome {
    pub fn records_collected(&self) -> usize {
        self.report.records.len()
    }

    pub fn failures(&self) -> Vec<RegionFailure> {
        self.report.failures()
    }

    pub fn is_partial(&self) -> bool {
        self.report.is_partial()
    }
}

/// Drives discover, collect and finalize for a tracked account.
pub struct CollectionOrchestrator {
    config: CollectorConfig,
    provider: Arc<dyn ProviderClient>,
    sink: Arc<dyn ReportSink>,
}

impl CollectionOrchestrator {
    pub fn new(
        config: CollectorConfig,
        provider: Arc<dyn ProviderClient>,
        sink: Arc<dyn ReportSink>,
    ) -> Self {
        Self {
            config,
            provider,
            sink,
        }
    }

    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    /// Collect the account's reserved resources and persist the report.
    ///
    /// Region failures do not abort the run: they are returned in the
    /// outcome next to the records that were collected.
    #[instrument(skip(self, account, cancel), fields(account = account.id))]
    pub async fn collect_daily_report(
        &self,
        account: &CloudAccount,
        cancel: &CancellationToken,
    ) -> CollectResult<CollectionOutcome> {
        info!("Fetching reserved resources");
        let report = self.collect(account, cancel).await?;
        self.finalize(account, report).await
    }

    /// Run discover and collect without persisting.
    ///
    /// Fails with [`CollectError::Config`] before any provider call when the
    /// configuration does not validate.
    pub async fn collect(
        &self,
        account: &CloudAccount,
        cancel: &CancellationToken,
    ) -> CollectResult<DailyReport> {
        self.config.validate()?;
        let discovery = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(CollectError::Cancelled),
            discovery = self.discover(account) => discovery?,
        };
        self.collect_regions(discovery, cancel).await
    }

    #[instrument(skip(self, account), fields(stage = %Stage::Discover))]
    async fn discover(&self, account: &CloudAccount) -> CollectResult<Discovery> {
        let credentials = self
            .provider
            .assume_role(account, &self.config.session_name)
            .await
            .map_err(|e| {
                error!(error = %e, "Error when getting temporary credentials");
                CollectError::discovery(DiscoveryStep::Credentials, e)
            })?;
        if credentials.is_expired_at(Utc::now()) {
            error!(expires_at = ?credentials.expires_at, "Temporary credentials already expired");
            return Err(CollectError::discovery(
                DiscoveryStep::Credentials,
                ProviderError::Credentials("temporary credentials already expired".to_string()),
            ));
        }

        let home = &self.config.default_region;
        let account_id = self
            .provider
            .resolve_account_id(&credentials, home)
            .await
            .map_err(|e| {
                error!(error = %e, "Error when getting account id");
                CollectError::discovery(DiscoveryStep::AccountId, e)
            })?;

        let mut regions = self
            .provider
            .list_regions(&credentials, home)
            .await
            .map_err(|e| {
                error!(error = %e, "Error when fetching regions list");
                CollectError::discovery(DiscoveryStep::Regions, e)
            })?;
        regions.sort();
        regions.dedup();

        info!(account_id = %account_id, regions = regions.len(), "Discovered regions");
        Ok(Discovery {
            credentials: Arc::new(credentials),
            account_id,
            regions,
        })
    }

    #[instrument(
        skip(self, discovery, cancel),
        fields(
            stage = %Stage::Collect,
            account_id = %discovery.account_id,
            run_id = tracing::field::Empty
        )
    )]
    async fn collect_regions(
        &self,
        discovery: Discovery,
        cancel: &CancellationToken,
    ) -> CollectResult<DailyReport> {
        let run_id = Uuid::new_v4();
        tracing::Span::current().record("run_id", tracing::field::display(run_id));

        let run_token = cancel.child_token();
        let capacity = self.config.channel_capacity.max(1);
        let assembler = ReportAssembler::new(
            discovery.account_id.clone(),
            Utc::now(),
            self.config.report_kind,
        );

        let mut collectors = JoinSet::new();
        let mut inputs = Vec::with_capacity(discovery.regions.len());
        for region in &discovery.regions {
            let (tx, rx) = mpsc::channel(capacity);
            let collector = RegionCollector::new(
                region.clone(),
                self.provider.clone(),
                discovery.credentials.clone(),
            );
            collectors.spawn(collector.run(tx, run_token.clone()));
            inputs.push(rx);
        }

        let mut merged = FanIn::merge(inputs, capacity, run_token.clone());
        let deadline = tokio::time::sleep(self.config.timeout());
        tokio::pin!(deadline);
        let mut timed_out = false;

        let mut records = Vec::new();
        loop {
            tokio::select! {
                item = merged.recv() => match item {
                    Some(record) => records.push(assembler.assemble(record)),
                    None => break,
                },
                _ = &mut deadline, if !timed_out => {
                    warn!(timeout = ?self.config.timeout(), "Collection timed out, cancelling collectors");
                    timed_out = true;
                    run_token.cancel();
                }
            }
        }

        let summary = merged.finish().await?;

        let mut regions = Vec::with_capacity(discovery.regions.len());
        let mut panicked = None;
        while let Some(joined) = collectors.join_next().await {
            match joined {
                Ok(outcome) => regions.push(outcome),
                Err(e) => {
                    error!(error = %e, "Region collector task failed");
                    panicked.get_or_insert_with(|| e.to_string());
                }
            }
        }
        regions.sort_by(|a, b| a.region.cmp(&b.region));

        if let Some(message) = panicked {
            return Err(CollectError::CollectorTask(message));
        }
        if !summary.is_clean() {
            let messages: Vec<String> = summary.faults.iter().map(|f| f.message.clone()).collect();
            return Err(CollectError::MergeFault(messages.join("; ")));
        }
        if timed_out {
            return Err(CollectError::TimedOut(self.config.timeout()));
        }
        if cancel.is_cancelled() {
            if !is_complete(&regions, summary.forwarded) {
                warn!(records = records.len(), "Collection cancelled");
                return Err(CollectError::Cancelled);
            }
            info!("Cancellation arrived after every region completed, keeping the report");
        }

        for outcome in &regions {
            if let Some(failure) = outcome.failure() {
                warn!(
                    region = %failure.region,
                    records = failure.records_emitted,
                    error = %failure.error,
                    "Region collection failed"
                );
            }
        }
        info!(
            records = records.len(),
            regions = regions.len(),
            forwarded = summary.forwarded,
            "Collected reserved resources"
        );

        Ok(DailyReport {
            run_id,
            account_id: discovery.account_id,
            report_date: assembler.report_date(),
            kind: assembler.kind(),
            records,
            regions,
        })
    }

    #[instrument(skip(self, account, report), fields(stage = %Stage::Finalize, run_id = %report.run_id))]
    async fn finalize(
        &self,
        account: &CloudAccount,
        report: DailyReport,
    ) -> CollectResult<CollectionOutcome> {
        if report.is_partial() && !self.config.persist_partial {
            warn!(
                failures = report.failures().len(),
                "Skipping import of partial report"
            );
            return Ok(CollectionOutcome {
                report,
                persisted: false,
            });
        }

        self.sink
            .import_report_records(account, &report.records)
            .await
            .map_err(|e| {
                error!(error = %e, "Error when importing report records");
                CollectError::Sink(e)
            })?;

        info!(records = report.records.len(), "Imported report records");
        Ok(CollectionOutcome {
            report,
            persisted: true,
        })
    }
}

/// Every region listed to the end and every emitted record was forwarded.
fn is_complete(regions: &[RegionOutcome], forwarded: usize) -> bool {
    let emitted: usize = regions.iter().map(|outcome| outcome.records_emitted).sum();
    emitted == forwarded
        && regions.iter().all(|outcome| {
            matches!(
                outcome.status,
                RegionStatus::Completed | RegionStatus::Failed(_)
            )
        })
}
