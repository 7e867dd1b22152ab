//! Statistics for scan runs.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

/// Counters shared by the producers, the workers and the driver.
///
/// All counters are relaxed atomics; they are only read for progress
/// reporting and once more for the final summary.
#[derive(Debug)]
pub struct RunStats {
    /// When the run started
    started_at: Mutex<DateTime<Utc>>,

    /// Candidates pushed into the queue
    candidates: AtomicU64,

    /// Candidates whose probe has finished
    probed: AtomicU64,

    /// Buckets confirmed to exist
    found: AtomicU64,

    /// Candidates that do not exist
    not_found: AtomicU64,

    /// Probes abandoned after throttling
    rate_limited: AtomicU64,

    /// Buckets whose region could not be resolved
    unresolved: AtomicU64,

    /// Probes abandoned on unclassified errors
    errors: AtomicU64,
}

impl Default for RunStats {
    fn default() -> Self {
        Self::new()
    }
}

impl RunStats {
    /// Create a new stats tracker with the current time as start time.
    pub fn new() -> Self {
        Self {
            started_at: Mutex::new(Utc::now()),
            candidates: AtomicU64::new(0),
            probed: AtomicU64::new(0),
            found: AtomicU64::new(0),
            not_found: AtomicU64::new(0),
            rate_limited: AtomicU64::new(0),
            unresolved: AtomicU64::new(0),
            errors: AtomicU64::new(0),
        }
    }

    /// Zero every counter and restart the clock.
    pub fn reset(&self) {
        *self
            .started_at
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Utc::now();
        for counter in [
            &self.candidates,
            &self.probed,
            &self.found,
            &self.not_found,
            &self.rate_limited,
            &self.unresolved,
            &self.errors,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }

    /// Record a candidate entering the queue.
    pub fn record_candidate(&self) {
        self.candidates.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a confirmed bucket.
    pub fn record_found(&self) {
        self.probed.fetch_add(1, Ordering::Relaxed);
        self.found.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a candidate that does not exist.
    pub fn record_not_found(&self) {
        self.probed.fetch_add(1, Ordering::Relaxed);
        self.not_found.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a probe abandoned after throttling.
    pub fn record_rate_limited(&self) {
        self.probed.fetch_add(1, Ordering::Relaxed);
        self.rate_limited.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a bucket whose region could not be resolved.
    pub fn record_unresolved(&self) {
        self.probed.fetch_add(1, Ordering::Relaxed);
        self.unresolved.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a probe abandoned on an unclassified error.
    pub fn record_error(&self) {
        self.probed.fetch_add(1, Ordering::Relaxed);
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Candidates pushed so far.
    pub fn candidates(&self) -> u64 {
        self.candidates.load(Ordering::Relaxed)
    }

    /// Probes finished so far.
    pub fn probed(&self) -> u64 {
        self.probed.load(Ordering::Relaxed)
    }

    /// Buckets found so far.
    pub fn found(&self) -> u64 {
        self.found.load(Ordering::Relaxed)
    }

    /// When the run started.
    pub fn started_at(&self) -> DateTime<Utc> {
        *self
            .started_at
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Take a snapshot of the current counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            started_at: Some(self.started_at()),
            completed_at: None,
            candidates: self.candidates.load(Ordering::Relaxed),
            probed: self.probed.load(Ordering::Relaxed),
            found: self.found.load(Ordering::Relaxed),
            not_found: self.not_found.load(Ordering::Relaxed),
            rate_limited: self.rate_limited.load(Ordering::Relaxed),
            unresolved: self.unresolved.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`RunStats`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// When the run started
    pub started_at: Option<DateTime<Utc>>,

    /// When the run completed
    pub completed_at: Option<DateTime<Utc>>,

    /// Candidates generated
    pub candidates: u64,

    /// Probes finished
    pub probed: u64,

    /// Buckets found
    pub found: u64,

    /// Candidates that did not exist
    pub not_found: u64,

    /// Probes abandoned after throttling
    pub rate_limited: u64,

    /// Buckets whose region could not be resolved
    pub unresolved: u64,

    /// Probes abandoned on unclassified errors
    pub errors: u64,
}

impl StatsSnapshot {
    /// Mark the snapshot as the final one.
    pub fn complete(&mut self) {
        self.completed_at = Some(Utc::now());
    }

    /// Duration of the run.
    pub fn duration(&self) -> Option<Duration> {
        match (self.started_at, self.completed_at) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }

    /// Probes abandoned for any reason.
    pub fn abandoned(&self) -> u64 {
        self.rate_limited + self.unresolved + self.errors
    }

    /// Throughput in probes per second.
    pub fn probes_per_second(&self) -> Option<f64> {
        self.duration().map(|d| {
            let secs = d.num_milliseconds() as f64 / 1000.0;
            if secs > 0.0 {
                self.probed as f64 / secs
            } else {
                0.0
            }
        })
    }
}
