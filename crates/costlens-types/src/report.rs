//! Report records: resource records stamped with reporting context.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::account::AccountId;
use crate::resource::ResourceRecord;

/// Kind of report a record belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    #[default]
    Daily,
    Monthly,
}

impl ReportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Daily => "daily",
            ReportKind::Monthly => "monthly",
        }
    }
}

impl std::fmt::Display for ReportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown report kind: {0}")]
pub struct ParseReportKindError(pub String);

impl FromStr for ReportKind {
    type Err = ParseReportKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "daily" => Ok(ReportKind::Daily),
            "monthly" => Ok(ReportKind::Monthly),
            other => Err(ParseReportKindError(other.to_string())),
        }
    }
}

/// A persistable report entry.
///
/// One-to-one with the embedded [`ResourceRecord`]; every record of a run
/// shares the same `account`, `report_date` and `report_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRecord {
    pub account: AccountId,
    pub report_date: DateTime<Utc>,
    pub report_type: ReportKind,
    pub instance: ResourceRecord,
}
