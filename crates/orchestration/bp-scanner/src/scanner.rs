//! The scan driver.
//!
//! Shutdown runs in a fixed order so no result is lost:
//! 1. every producer finishes (or is cancelled)
//! 2. the candidate queue is closed
//! 3. every worker observes the end of the queue and exits
//! 4. the last worker drops its event sender, closing the result queue
//! 5. the aggregator drains what is left and flushes the sink

use bp_error::{ConfigError, Result};
use bp_traits::{ResultSink, StorageClient};
use bp_types::Candidate;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::aggregator::{AggregateSummary, aggregate};
use crate::config::ScanConfig;
use crate::generator::{CandidateSource, produce};
use crate::pool::WorkerPool;
use crate::prober::Prober;
use crate::stats::{RunStats, StatsSnapshot};

/// Outcome of a completed scan.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    /// Final counters
    pub stats: StatsSnapshot,

    /// What reached the sink
    pub delivered: AggregateSummary,

    /// Whether the run was cut short
    pub cancelled: bool,
}

/// Runs candidate sources through a pool of probers into a sink.
pub struct Scanner<C: StorageClient + 'static> {
    config: ScanConfig,
    prober: Arc<Prober<C>>,
    stats: Arc<RunStats>,
    cancel: CancellationToken,
}

impl<C: StorageClient + 'static> Scanner<C> {
    /// Create a scanner over `client`.
    pub fn new(config: ScanConfig, client: Arc<C>) -> std::result::Result<Self, ConfigError> {
        config.validate()?;

        let prober = Prober::new(
            client,
            config.location_region.clone(),
            config.probe_settings(),
        );

        Ok(Self {
            config,
            prober: Arc::new(prober),
            stats: Arc::new(RunStats::new()),
            cancel: CancellationToken::new(),
        })
    }

    /// Use an externally owned cancellation token.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Live counters, for progress reporting.
    pub fn stats(&self) -> &Arc<RunStats> {
        &self.stats
    }

    /// Token that aborts the run when cancelled.
    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// The configuration in effect.
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Probe every candidate from `sources` and report found buckets to `sink`.
    ///
    /// Counters and the clock restart with each run. Runs on one scanner
    /// must not overlap.
    pub async fn run<S>(&self, sources: Vec<CandidateSource>, sink: &mut S) -> Result<ScanReport>
    where
        S: ResultSink + ?Sized,
    {
        if sources.is_empty() {
            return Err(ConfigError::NoSources.into());
        }
        self.stats.reset();

        info!(
            threads = self.config.threads,
            sources = sources.len(),
            initial_region = %self.config.initial_region,
            write_check = self.config.write_check,
            "Starting scan"
        );

        let (candidate_tx, candidate_rx) =
            async_channel::bounded::<Candidate>(self.config.threads);
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let pool = WorkerPool::spawn(
            self.config.threads,
            self.prober.clone(),
            self.config.initial_region.clone(),
            candidate_rx,
            event_tx,
            self.stats.clone(),
            self.cancel.clone(),
        );

        let producers: Vec<_> = sources
            .into_iter()
            .map(|source| {
                let tx = candidate_tx.clone();
                let stats = self.stats.clone();
                let cancel = self.cancel.clone();
                tokio::task::spawn_blocking(move || produce(source, tx, stats, cancel))
            })
            .collect();

        let dispatch = async {
            let mut generated = 0u64;
            for result in futures::future::join_all(producers).await {
                match result {
                    Ok(pushed) => generated += pushed,
                    Err(e) => error!(error = %e, "Candidate producer panicked"),
                }
            }
            debug!(generated, "All producers finished, closing candidate queue");
            candidate_tx.close();

            pool.join().await;
        };

        let ((), delivered) = tokio::join!(dispatch, aggregate(sink, event_rx));

        let mut stats = self.stats.snapshot();
        stats.complete();

        let cancelled = self.cancel.is_cancelled();
        info!(
            candidates = stats.candidates,
            probed = stats.probed,
            found = stats.found,
            abandoned = stats.abandoned(),
            cancelled,
            "Scan completed"
        );

        Ok(ScanReport {
            stats,
            delivered,
            cancelled,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::CollectingSink;
    use crate::wordlist::Wordlist;
    use async_trait::async_trait;
    use bp_error::{BpError, StorageError};
    use bp_traits::StorageResult;
    use bp_types::Region;
    use bytes::Bytes;

    struct Nothing;

    #[async_trait]
    impl StorageClient for Nothing {
        async fn list_empty(&self, _bucket: &str, _region: &Region) -> StorageResult<()> {
            Err(StorageError::not_found())
        }

        async fn bucket_location(
            &self,
            _bucket: &str,
            _region: &Region,
        ) -> StorageResult<Option<String>> {
            Ok(None)
        }

        async fn put_object(
            &self,
            _bucket: &str,
            _key: &str,
            _payload: Bytes,
            _region: &Region,
        ) -> StorageResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_no_sources_is_config_error() {
        let scanner = Scanner::new(ScanConfig::new().with_threads(2), Arc::new(Nothing)).unwrap();
        let err = scanner
            .run(Vec::new(), &mut CollectingSink::new())
            .await
            .unwrap_err();
        assert!(matches!(err, BpError::Config(ConfigError::NoSources)));
    }

    #[tokio::test]
    async fn test_invalid_config_rejected_up_front() {
        let result = Scanner::new(ScanConfig::new().with_threads(0), Arc::new(Nothing));
        assert!(matches!(result, Err(ConfigError::InvalidThreads(0))));
    }

    #[tokio::test]
    async fn test_cancelled_run_still_completes() {
        let scanner = Scanner::new(ScanConfig::new().with_threads(1), Arc::new(Nothing)).unwrap();
        scanner.cancel_token().cancel();

        let text = (0..1000).map(|i| format!("bucket-{i}\n")).collect::<String>();
        let mut sink = CollectingSink::new();
        let report = scanner
            .run(
                vec![CandidateSource::Wordlist(Wordlist::from_text(text))],
                &mut sink,
            )
            .await
            .unwrap();

        assert!(report.cancelled);
        assert!(report.stats.probed < 1000);
        assert!(sink.is_flushed());
    }

    #[tokio::test]
    async fn test_each_run_counts_from_zero() {
        let scanner = Scanner::new(ScanConfig::new().with_threads(2), Arc::new(Nothing)).unwrap();
        let words = || vec![CandidateSource::Wordlist(Wordlist::from_text("a\nb\nc\n"))];

        let first = scanner
            .run(words(), &mut CollectingSink::new())
            .await
            .unwrap();
        let second = scanner
            .run(words(), &mut CollectingSink::new())
            .await
            .unwrap();

        assert_eq!(first.stats.probed, 3);
        assert_eq!(second.stats.probed, 3);
        assert_eq!(second.stats.not_found, 3);
        assert!(second.stats.started_at >= first.stats.started_at);
    }
}
