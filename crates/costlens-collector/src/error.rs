//! Error types for collection runs.

use std::time::Duration;

use costlens_types::Region;
use thiserror::Error;

/// Failure reported by a [`ProviderClient`](crate::provider::ProviderClient) call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("credentials rejected: {0}")]
    Credentials(String),

    #[error("{operation} failed: {message}")]
    Api { operation: String, message: String },

    #[error("{operation} throttled by provider")]
    Throttled { operation: String },

    #[error("unknown region: {0}")]
    UnknownRegion(Region),
}

impl ProviderError {
    pub fn api(operation: impl Into<String>, message: impl Into<String>) -> Self {
        ProviderError::Api {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

/// Failure reported by a [`ReportSink`](crate::sink::ReportSink).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    #[error("import rejected: {0}")]
    Rejected(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Discovery step that failed before any collector started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryStep {
    Credentials,
    AccountId,
    Regions,
}

impl std::fmt::Display for DiscoveryStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiscoveryStep::Credentials => write!(f, "credential acquisition"),
            DiscoveryStep::AccountId => write!(f, "account id resolution"),
            DiscoveryStep::Regions => write!(f, "region listing"),
        }
    }
}

/// Errors that abort a collection run.
///
/// Region-local failures are not errors at this level: they are reported in
/// the run's [`DailyReport`](crate::orchestrator::DailyReport).
#[derive(Error, Debug)]
pub enum CollectError {
    #[error("discovery failed during {step}: {source}")]
    Discovery {
        step: DiscoveryStep,
        #[source]
        source: ProviderError,
    },

    #[error("fan-in merge fault: {0}")]
    MergeFault(String),

    #[error("collector task panicked: {0}")]
    CollectorTask(String),

    #[error("report import failed: {0}")]
    Sink(#[from] SinkError),

    #[error("collection cancelled")]
    Cancelled,

    #[error("collection timed out after {0:?}")]
    TimedOut(Duration),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl CollectError {
    pub(crate) fn discovery(step: DiscoveryStep, source: ProviderError) -> Self {
        CollectError::Discovery { step, source }
    }

    /// Whether the run was stopped rather than failed.
    pub fn is_interrupted(&self) -> bool {
        matches!(self, CollectError::Cancelled | CollectError::TimedOut(_))
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;
pub type SinkResult<T> = Result<T, SinkError>;
pub type CollectResult<T> = Result<T, CollectError>;
