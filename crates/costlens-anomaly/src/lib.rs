//! # costlens-anomaly
//!
//! Post-processing of cost anomaly series returned by a search backend.
//!
//! - [`trim_anomaly_series`]: pure filter removing points before a cutoff
//! - [`AnomalyQuery`]: day-granular query window
//! - [`AnomalyService`]: runs a query through a [`SearchBackend`], treats a
//!   missing index as "not indexed yet" and trims the result
//!
//! Trimming keeps points dated on or after the cutoff, preserves order,
//! never removes a category and keeps points whose date does not parse.

pub mod backend;
pub mod error;
pub mod query;
pub mod service;
pub mod trim;

pub use backend::{SearchBackend, StaticBackend};
pub use error::{AnomalyError, AnomalyResult, BackendError};
pub use query::AnomalyQuery;
pub use service::{AnomalyResponse, AnomalyService};
pub use trim::{day_start, is_before_cutoff, parse_point_date, retain_from, trim_anomaly_series};
