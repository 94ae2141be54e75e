//! Collection run configuration.

use std::time::Duration;

use costlens_types::{Region, ReportKind};
use serde::{Deserialize, Serialize};

use crate::error::{CollectError, CollectResult};

/// Configuration for a [`CollectionOrchestrator`](crate::CollectionOrchestrator).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// Region used for account and region discovery
    #[serde(default = "default_region")]
    pub default_region: Region,

    /// Session name presented when assuming the account role
    #[serde(default = "default_session_name")]
    pub session_name: String,

    /// Buffer size of each collector channel and of the merged output
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    /// Upper bound on the collect stage, in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Persist reports even when some regions failed
    #[serde(default = "default_true")]
    pub persist_partial: bool,

    /// Kind stamped on every report record
    #[serde(default)]
    pub report_kind: ReportKind,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            default_region: default_region(),
            session_name: default_session_name(),
            channel_capacity: default_channel_capacity(),
            timeout_secs: default_timeout(),
            persist_partial: true,
            report_kind: ReportKind::Daily,
        }
    }
}

impl CollectorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check the values that cannot be expressed by the type.
    pub fn validate(&self) -> CollectResult<()> {
        if self.channel_capacity == 0 {
            return Err(CollectError::Config(
                "channel_capacity must be at least 1".to_string(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(CollectError::Config(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.session_name.trim().is_empty() {
            return Err(CollectError::Config("session_name is empty".to_string()));
        }
        Ok(())
    }
}

fn default_region() -> Region {
    Region::from("us-east-1")
}

fn default_session_name() -> String {
    "costlens-daily-reserved".to_string()
}

fn default_channel_capacity() -> usize {
    16
}

fn default_timeout() -> u64 {
    300
}

fn default_true() -> bool {
    true
}
