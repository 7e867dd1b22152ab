//! Bucket enumeration and probe engine.
//!
//! Candidate names come from wordlists and domain mutation, flow through a
//! bounded queue to a fixed pool of workers, and every worker runs the probe
//! state machine against a [`StorageClient`](bp_traits::StorageClient). Found
//! buckets reach a single aggregator that owns the [`ResultSink`](bp_traits::ResultSink).
//!
//! # Example
//!
//! ```no_run
//! use bp_scanner::{S3Config, S3StorageClient, ScanConfig, Scanner, SourceConfig};
//! use bp_scanner::sink::ConsoleSink;
//! use std::sync::Arc;
//!
//! # async fn example() -> bp_error::Result<()> {
//! let client = S3StorageClient::new(S3Config::new()).await?;
//! let scanner = Scanner::new(ScanConfig::new().with_threads(50), Arc::new(client))?;
//!
//! let sources = SourceConfig::new().with_wordlist("buckets.txt").open()?;
//! let report = scanner.run(sources, &mut ConsoleSink::stdout()).await?;
//! println!("found {}", report.stats.found);
//! # Ok(())
//! # }
//! ```

mod aggregator;
mod config;
mod generator;
mod pool;
mod prober;
mod region;
mod retry;
mod s3;
mod scanner;
mod stats;
mod wordlist;

pub mod sink;

pub use aggregator::{AggregateSummary, aggregate};
pub use config::{DEFAULT_INITIAL_REGION, DEFAULT_THREADS, ScanConfig, SourceConfig};
pub use generator::{CandidateSource, MutationPlan, Mutations, SEPARATORS};
pub use pool::{ProbeEvent, WorkerPool};
pub use prober::{DEFAULT_WRITE_PAYLOAD, ProbeOutcome, ProbeSettings, Prober};
pub use region::{RegionResolver, ResolveError};
pub use retry::{RetryBudget, RetryConfig, with_backoff};
pub use s3::{
    DEFAULT_PRECHECK_ENDPOINT, HttpPrecheck, S3Config, S3StorageClient, create_region_client,
    load_sdk_config,
};
pub use scanner::{ScanReport, Scanner};
pub use stats::{RunStats, StatsSnapshot};
pub use wordlist::Wordlist;
