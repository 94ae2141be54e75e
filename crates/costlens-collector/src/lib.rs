//! # costlens-collector
//!
//! Concurrent collection of reserved-capacity records across the regions of a
//! cloud provider.
//!
//! ## Key Components
//!
//! - [`RegionCollector`]: streams one region's records into its own channel
//! - [`FanIn`]: merges N channels into one, closing only after all inputs did
//! - [`ReportAssembler`]: stamps records with account, run time and kind
//! - [`CollectionOrchestrator`]: discover, collect, finalize
//!
//! The provider and the persistence layer are consumed through the
//! [`ProviderClient`] and [`ReportSink`] traits and passed in explicitly.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use costlens_collector::{
//!     CollectionOrchestrator, CollectorConfig, MemorySink, StaticProvider,
//! };
//! use costlens_types::{AccountId, CloudAccount};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() {
//! let provider = Arc::new(StaticProvider::new(AccountId::new("123456789012")));
//! let sink = Arc::new(MemorySink::new());
//! let orchestrator = CollectionOrchestrator::new(CollectorConfig::default(), provider, sink);
//!
//! let account = CloudAccount::new(1, "arn:aws:iam::123456789012:role/costlens", "ext");
//! let outcome = orchestrator
//!     .collect_daily_report(&account, &CancellationToken::new())
//!     .await
//!     .unwrap();
//! for failure in outcome.failures() {
//!     println!("region failed: {failure}");
//! }
//! # }
//! ```
//!
//! ## Failure semantics
//!
//! - Credential, account id or region discovery failures abort the run.
//! - A failing region does not affect the others; the run returns a partial
//!   report together with the failed regions.
//! - Cancellation and timeout stop every collector and return an error after
//!   all tasks have exited; nothing is persisted.

pub mod assembler;
pub mod collector;
pub mod config;
pub mod error;
pub mod merge;
pub mod orchestrator;
pub mod provider;
pub mod sink;

pub use assembler::ReportAssembler;
pub use collector::{RegionCollector, RegionFailure, RegionOutcome, RegionStatus};
pub use config::CollectorConfig;
pub use error::{
    CollectError, CollectResult, DiscoveryStep, ProviderError, ProviderResult, SinkError,
    SinkResult,
};
pub use merge::{FanIn, MergeFault, MergeSummary};
pub use orchestrator::{CollectionOrchestrator, CollectionOutcome, DailyReport, Discovery, Stage};
pub use provider::{ProviderClient, ResourcePage, StaticProvider};
pub use sink::{MemorySink, ReportSink};
