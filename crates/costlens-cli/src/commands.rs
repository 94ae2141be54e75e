//! Subcommand implementations.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use costlens_anomaly::{day_start, trim_anomaly_series};
use costlens_collector::{CollectionOrchestrator, CollectionOutcome, CollectorConfig, RegionFailure};
use costlens_types::AnomalySeriesSet;
use serde::Serialize;
use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::fixture::Fixture;
use crate::sink::JsonFileSink;

/// Summary of a collection run, logged once the run ends.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectSummary {
    pub run_id: String,
    pub account_id: String,
    pub records: usize,
    pub persisted: bool,
    pub failures: Vec<RegionFailure>,
}

impl From<&CollectionOutcome> for CollectSummary {
    fn from(outcome: &CollectionOutcome) -> Self {
        Self {
            run_id: outcome.report.run_id.to_string(),
            account_id: outcome.report.account_id.to_string(),
            records: outcome.records_collected(),
            persisted: outcome.persisted,
            failures: outcome.failures(),
        }
    }
}

/// Run one daily collection against a fixture-backed provider.
pub async fn collect(
    config: CollectorConfig,
    fixture: &Path,
    output: Option<PathBuf>,
    cancel: CancellationToken,
) -> Result<CollectSummary> {
    let fixture = Fixture::load(fixture).await?;
    let orchestrator = CollectionOrchestrator::new(
        config,
        Arc::new(fixture.provider()),
        Arc::new(JsonFileSink::new(output)),
    );

    let outcome = match orchestrator
        .collect_daily_report(&fixture.account, &cancel)
        .await
    {
        Ok(outcome) => outcome,
        Err(e) if e.is_interrupted() => {
            warn!(error = %e, "Collection stopped, nothing persisted");
            return Err(e.into());
        }
        Err(e) => return Err(anyhow::Error::new(e).context("collection failed")),
    };

    let summary = CollectSummary::from(&outcome);
    info!(
        run_id = %summary.run_id,
        records = summary.records,
        persisted = summary.persisted,
        partial = outcome.is_partial(),
        "Collection finished"
    );
    Ok(summary)
}

/// Trim an anomaly series set read from `input` (stdin when `None`).
pub async fn trim(cutoff: NaiveDate, input: Option<&Path>) -> Result<AnomalySeriesSet> {
    let raw = match input {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut raw = String::new();
            tokio::io::stdin()
                .read_to_string(&mut raw)
                .await
                .context("reading stdin")?;
            raw
        }
    };
    trim_str(&raw, cutoff)
}

fn trim_str(raw: &str, cutoff: NaiveDate) -> Result<AnomalySeriesSet> {
    let series: AnomalySeriesSet =
        serde_json::from_str(raw).context("parsing anomaly series")?;
    Ok(trim_anomaly_series(series, day_start(cutoff)))
}
