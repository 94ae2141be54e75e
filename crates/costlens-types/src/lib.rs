//! # costlens-types
//!
//! Shared data model for the Costlens workspace:
//!
//! - **Identity**: [`Region`], [`AccountId`], [`CloudAccount`], [`Credentials`]
//! - **Collection**: [`ResourceRecord`] as produced by a region collector
//! - **Reporting**: [`ReportRecord`] and [`ReportKind`]
//! - **Anomalies**: [`AnomalyPoint`] and [`AnomalySeriesSet`]
//!
//! All values here are short-lived: they are produced during one collection
//! or query pass and discarded after assembly or serialization.

pub mod account;
pub mod anomaly;
pub mod report;
pub mod resource;

pub use account::{AccountId, CloudAccount, Credentials, Region};
pub use anomaly::{AnomalyPoint, AnomalySeriesSet};
pub use report::{ParseReportKindError, ReportKind, ReportRecord};
pub use resource::{ResourceRecord, Tenancy};
