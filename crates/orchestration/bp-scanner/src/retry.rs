//! Backoff for throttled storage requests.
//!
//! Only [`StorageErrorKind::RateLimited`] is retried. Every other outcome,
//! success or failure, is handed straight back to the prober's state machine.

use bp_error::{StorageError, StorageErrorKind};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Configuration for retry behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retries of one request before giving up.
    pub max_retries: u32,
    /// Initial backoff duration in milliseconds.
    pub initial_backoff_ms: u64,
    /// Maximum backoff duration in milliseconds.
    pub max_backoff_ms: u64,
    /// Whether to add jitter to backoff times.
    pub jitter: bool,
    /// Backoff sleeps each worker may spend over the whole run.
    pub worker_budget: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 200,
            max_backoff_ms: 10_000,
            jitter: true,
            worker_budget: 24,
        }
    }
}

impl RetryConfig {
    /// Create a new retry configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// A configuration that never retries.
    pub fn disabled() -> Self {
        Self {
            max_retries: 0,
            worker_budget: 0,
            ..Self::default()
        }
    }

    /// Set the maximum number of retries.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the initial backoff in milliseconds.
    pub fn with_initial_backoff_ms(mut self, initial_backoff_ms: u64) -> Self {
        self.initial_backoff_ms = initial_backoff_ms;
        self
    }

    /// Set the maximum backoff in milliseconds.
    pub fn with_max_backoff_ms(mut self, max_backoff_ms: u64) -> Self {
        self.max_backoff_ms = max_backoff_ms;
        self
    }

    /// Enable or disable jitter.
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Set the per-worker retry budget.
    pub fn with_worker_budget(mut self, worker_budget: u32) -> Self {
        self.worker_budget = worker_budget;
        self
    }

    /// Calculate the backoff duration for a given attempt.
    pub fn backoff_duration(&self, attempt: u32) -> Duration {
        let base_ms = self
            .initial_backoff_ms
            .saturating_mul(2u64.saturating_pow(attempt));
        let capped_ms = base_ms.min(self.max_backoff_ms);

        let final_ms = if self.jitter {
            let jitter_range = capped_ms / 4; // 25% jitter
            let jitter = rand::rng().random_range(0..=jitter_range);
            capped_ms.saturating_add(jitter)
        } else {
            capped_ms
        };

        Duration::from_millis(final_ms)
    }

    /// Create a fresh budget for one worker.
    pub fn budget(&self) -> RetryBudget {
        RetryBudget::new(self.worker_budget)
    }
}

/// Backoff sleeps a single worker may still spend.
///
/// Owned by one worker and never shared, so a burst of throttling on one
/// worker cannot starve the others.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryBudget {
    remaining: u32,
}

impl RetryBudget {
    /// Create a budget with `tokens` retries.
    pub fn new(tokens: u32) -> Self {
        Self { remaining: tokens }
    }

    /// An empty budget.
    pub fn exhausted() -> Self {
        Self::new(0)
    }

    /// Tokens left.
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Spend one token. Returns false if none were left.
    pub fn try_spend(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }
}

/// Execute a storage request, backing off while the service throttles us.
///
/// Retries stop when the per-request limit or the worker's budget runs out;
/// the last rate-limit error is then returned.
pub async fn with_backoff<F, Fut, T>(
    config: &RetryConfig,
    budget: &mut RetryBudget,
    operation_name: &str,
    mut operation: F,
) -> Result<T, StorageError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, StorageError>>,
{
    let mut attempt = 0;

    loop {
        match operation().await {
            Err(e) if e.kind == StorageErrorKind::RateLimited => {
                if attempt >= config.max_retries {
                    debug!(operation = operation_name, attempt, "Retry limit reached");
                    return Err(e);
                }
                if !budget.try_spend() {
                    debug!(operation = operation_name, attempt, "Worker retry budget exhausted");
                    return Err(e);
                }

                let backoff = config.backoff_duration(attempt);
                warn!(
                    operation = operation_name,
                    attempt,
                    error = %e,
                    backoff_ms = backoff.as_millis() as u64,
                    "Rate limited, backing off"
                );
                sleep(backoff).await;
                attempt += 1;
            }
            other => return other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_config() -> RetryConfig {
        RetryConfig::new()
            .with_initial_backoff_ms(1)
            .with_max_backoff_ms(2)
            .with_jitter(false)
    }

    #[test]
    fn test_retry_config_defaults() {
        let config = RetryConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.initial_backoff_ms, 200);
        assert_eq!(config.max_backoff_ms, 10_000);
        assert!(config.jitter);
        assert_eq!(config.budget().remaining(), 24);
    }

    #[test]
    fn test_backoff_duration_no_jitter() {
        let config = RetryConfig::new()
            .with_initial_backoff_ms(100)
            .with_max_backoff_ms(10_000)
            .with_jitter(false);

        assert_eq!(config.backoff_duration(0), Duration::from_millis(100));
        assert_eq!(config.backoff_duration(1), Duration::from_millis(200));
        assert_eq!(config.backoff_duration(2), Duration::from_millis(400));
        assert_eq!(config.backoff_duration(3), Duration::from_millis(800));
    }

    #[test]
    fn test_backoff_duration_capped() {
        let config = RetryConfig::new()
            .with_initial_backoff_ms(1000)
            .with_max_backoff_ms(2000)
            .with_jitter(false);

        assert_eq!(config.backoff_duration(1), Duration::from_millis(2000));
        assert_eq!(config.backoff_duration(40), Duration::from_millis(2000));
    }

    #[test]
    fn test_backoff_jitter_stays_in_range() {
        let config = RetryConfig::new()
            .with_initial_backoff_ms(400)
            .with_max_backoff_ms(10_000)
            .with_jitter(true);

        for _ in 0..50 {
            let backoff = config.backoff_duration(0);
            assert!(backoff >= Duration::from_millis(400));
            assert!(backoff <= Duration::from_millis(500));
        }
    }

    #[test]
    fn test_budget_spend() {
        let mut budget = RetryBudget::new(2);
        assert!(budget.try_spend());
        assert!(budget.try_spend());
        assert!(!budget.try_spend());
        assert_eq!(budget.remaining(), 0);
    }

    #[tokio::test]
    async fn test_success_after_throttling() {
        let calls = Arc::new(AtomicU32::new(0));
        let mut budget = RetryBudget::new(10);

        let result = with_backoff(&fast_config(), &mut budget, "list", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(StorageError::rate_limited())
                } else {
                    Ok(7)
                }
            }
        })
        .await;

        assert_eq!(result, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(budget.remaining(), 8);
    }

    #[tokio::test]
    async fn test_other_errors_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let mut budget = RetryBudget::new(10);

        let result: Result<(), _> = with_backoff(&fast_config(), &mut budget, "list", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(StorageError::access_denied()) }
        })
        .await;

        assert_eq!(result.unwrap_err().kind, StorageErrorKind::AccessDenied);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(budget.remaining(), 10);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let calls = Arc::new(AtomicU32::new(0));
        let mut budget = RetryBudget::new(100);
        let config = fast_config().with_max_retries(2);

        let result: Result<(), _> = with_backoff(&config, &mut budget, "list", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(StorageError::rate_limited()) }
        })
        .await;

        assert_eq!(result.unwrap_err().kind, StorageErrorKind::RateLimited);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhausted_budget_stops_retries() {
        let calls = Arc::new(AtomicU32::new(0));
        let mut budget = RetryBudget::exhausted();

        let result: Result<(), _> = with_backoff(&fast_config(), &mut budget, "list", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(StorageError::rate_limited()) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
