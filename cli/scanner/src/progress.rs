//! Progress reporting for bucketprobe.

use bp_cli_common::{format_duration, format_number};
use bp_scanner::RunStats;
use std::io::{self, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

/// Periodically prints the scan counters to stderr.
pub struct ProgressReporter {
    /// Whether progress reporting is enabled
    enabled: bool,
    /// Reporting interval
    interval: Duration,
    /// Counters owned by the scanner
    stats: Arc<RunStats>,
    /// Set when the reporter should exit
    stop: Arc<AtomicBool>,
    /// Start time
    start_time: Instant,
    /// Handle to the background reporter task
    handle: Option<JoinHandle<()>>,
}

impl ProgressReporter {
    /// Create a new progress reporter over `stats`.
    pub fn new(enabled: bool, interval_secs: u64, stats: Arc<RunStats>) -> Self {
        Self {
            enabled,
            interval: Duration::from_secs(interval_secs.max(1)),
            stats,
            stop: Arc::new(AtomicBool::new(false)),
            start_time: Instant::now(),
            handle: None,
        }
    }

    /// Start the background progress reporter.
    pub fn start(&mut self) {
        if !self.enabled {
            return;
        }

        let stats = Arc::clone(&self.stats);
        let stop = Arc::clone(&self.stop);
        let interval = self.interval;
        let start_time = self.start_time;

        let handle = tokio::spawn(async move {
            let mut interval_timer = tokio::time::interval(interval);
            interval_timer.tick().await; // Skip first immediate tick

            loop {
                interval_timer.tick().await;

                if stop.load(Ordering::Relaxed) {
                    break;
                }

                let _ = writeln!(
                    io::stderr(),
                    "[Progress] {} ({} elapsed)",
                    progress_line(&stats),
                    format_duration(start_time.elapsed())
                );
            }
        });

        self.handle = Some(handle);
    }

    /// Stop the progress reporter and print the final counters.
    pub async fn stop(mut self) {
        if !self.enabled {
            return;
        }

        self.stop.store(true, Ordering::Relaxed);

        if let Some(handle) = self.handle.take() {
            handle.abort();
            let _ = handle.await;
        }

        let _ = writeln!(
            io::stderr(),
            "[Progress] Complete: {} ({})",
            progress_line(&self.stats),
            format_duration(self.start_time.elapsed())
        );
    }
}

fn progress_line(stats: &RunStats) -> String {
    format!(
        "{} generated, {} probed, {} found",
        format_number(stats.candidates()),
        format_number(stats.probed()),
        format_number(stats.found())
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_line() {
        let stats = RunStats::new();
        for _ in 0..1500 {
            stats.record_candidate();
        }
        stats.record_found();
        stats.record_not_found();

        assert_eq!(progress_line(&stats), "1,500 generated, 2 probed, 1 found");
    }

    #[tokio::test]
    async fn test_disabled_reporter_is_inert() {
        let mut reporter = ProgressReporter::new(false, 1, Arc::new(RunStats::new()));
        reporter.start();
        assert!(reporter.handle.is_none());
        reporter.stop().await;
    }
}
