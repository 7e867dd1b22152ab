//! Fixed-size pool of probe workers.

use bp_traits::{Diagnostic, DiagnosticKind, StorageClient};
use bp_types::{Candidate, CheckResult, Region};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::prober::{ProbeOutcome, Prober};
use crate::stats::RunStats;

/// Something a worker hands to the aggregator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeEvent {
    /// A bucket was found
    Found(CheckResult),

    /// A probe was abandoned
    Diagnostic(Diagnostic),
}

/// Handles of the running workers.
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `threads` workers that drain `candidates` until it is closed and empty.
    ///
    /// Every worker holds its own clone of `events`; the event channel closes
    /// once the last worker exits.
    pub fn spawn<C: StorageClient + 'static>(
        threads: usize,
        prober: Arc<Prober<C>>,
        initial_region: Region,
        candidates: async_channel::Receiver<Candidate>,
        events: mpsc::UnboundedSender<ProbeEvent>,
        stats: Arc<RunStats>,
        cancel: CancellationToken,
    ) -> Self {
        info!(threads, region = %initial_region, "Starting probe workers");

        let handles = (0..threads)
            .map(|worker_id| {
                let worker = Worker {
                    id: worker_id,
                    prober: prober.clone(),
                    initial_region: initial_region.clone(),
                    candidates: candidates.clone(),
                    events: events.clone(),
                    stats: stats.clone(),
                    cancel: cancel.clone(),
                };
                tokio::spawn(worker.run())
            })
            .collect();

        Self { handles }
    }

    /// Number of workers.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Whether the pool has no workers.
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Wait for every worker to observe the end of the queue.
    pub async fn join(self) {
        let results = futures::future::join_all(self.handles).await;
        for (worker_id, result) in results.into_iter().enumerate() {
            if let Err(e) = result {
                error!(worker = worker_id, error = %e, "Probe worker panicked");
            }
        }
        debug!("All probe workers finished");
    }
}

struct Worker<C: StorageClient> {
    id: usize,
    prober: Arc<Prober<C>>,
    initial_region: Region,
    candidates: async_channel::Receiver<Candidate>,
    events: mpsc::UnboundedSender<ProbeEvent>,
    stats: Arc<RunStats>,
    cancel: CancellationToken,
}

impl<C: StorageClient> Worker<C> {
    async fn run(self) {
        let mut budget = self.prober.settings().retry.budget();
        let mut probed = 0u64;

        loop {
            let candidate = tokio::select! {
                biased;

                _ = self.cancel.cancelled() => {
                    // Unblocks producers waiting on a full queue
                    self.candidates.close();
                    debug!(worker = self.id, "Worker cancelled");
                    break;
                }
                next = self.candidates.recv() => match next {
                    Ok(candidate) => candidate,
                    Err(_) => break,
                },
            };

            let outcome = self
                .prober
                .probe(candidate.as_str(), &self.initial_region, &mut budget)
                .await;
            probed += 1;

            match outcome {
                ProbeOutcome::Found(result) => {
                    self.stats.record_found();
                    self.emit(ProbeEvent::Found(result));
                }
                ProbeOutcome::NotFound => self.stats.record_not_found(),
                ProbeOutcome::Abandoned(diagnostic) => {
                    match diagnostic.kind {
                        DiagnosticKind::RateLimited => self.stats.record_rate_limited(),
                        DiagnosticKind::RegionUnresolved => self.stats.record_unresolved(),
                        DiagnosticKind::ProbeFailed => self.stats.record_error(),
                    }
                    self.emit(ProbeEvent::Diagnostic(diagnostic));
                }
            }
        }

        debug!(
            worker = self.id,
            probed,
            budget_left = budget.remaining(),
            "Worker exiting"
        );
    }

    fn emit(&self, event: ProbeEvent) {
        if self.events.send(event).is_err() {
            warn!(worker = self.id, "Result queue closed, dropping event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prober::ProbeSettings;
    use async_trait::async_trait;
    use bp_error::StorageError;
    use bp_traits::StorageResult;
    use bytes::Bytes;

    /// Every bucket whose name starts with `live` exists and is listable.
    struct Prefix;

    #[async_trait]
    impl StorageClient for Prefix {
        async fn list_empty(&self, bucket: &str, _region: &Region) -> StorageResult<()> {
            if bucket.starts_with("live") {
                Ok(())
            } else {
                Err(StorageError::not_found())
            }
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
            Err(StorageError::access_denied())
        }
    }

    fn prober() -> Arc<Prober<Prefix>> {
        Arc::new(Prober::new(
            Arc::new(Prefix),
            Region::from_static("us-west-2"),
            ProbeSettings::default(),
        ))
    }

    #[tokio::test]
    async fn test_pool_drains_queue_and_closes_events() {
        let (tx, rx) = async_channel::bounded(4);
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        let stats = Arc::new(RunStats::new());

        let pool = WorkerPool::spawn(
            2,
            prober(),
            Region::from_static("us-west-2"),
            rx,
            event_tx,
            stats.clone(),
            CancellationToken::new(),
        );
        assert_eq!(pool.len(), 2);

        for name in ["live-a", "dead-b", "live-c", "dead-d", "dead-e"] {
            tx.send(Candidate::new(name).unwrap()).await.unwrap();
        }
        tx.close();
        pool.join().await;

        let mut found = Vec::new();
        while let Some(event) = event_rx.recv().await {
            if let ProbeEvent::Found(result) = event {
                found.push(result.name);
            }
        }
        found.sort();

        assert_eq!(found, vec!["live-a", "live-c"]);
        let snapshot = stats.snapshot();
        assert_eq!(snapshot.probed, 5);
        assert_eq!(snapshot.not_found, 3);
    }

    #[tokio::test]
    async fn test_cancel_closes_candidate_queue() {
        let (tx, rx) = async_channel::bounded::<Candidate>(1);
        let (event_tx, _event_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        let pool = WorkerPool::spawn(
            1,
            prober(),
            Region::from_static("us-west-2"),
            rx,
            event_tx,
            Arc::new(RunStats::new()),
            cancel.clone(),
        );

        cancel.cancel();
        pool.join().await;

        assert!(tx.is_closed());
        assert!(tx.send(Candidate::new("late").unwrap()).await.is_err());
    }
}
