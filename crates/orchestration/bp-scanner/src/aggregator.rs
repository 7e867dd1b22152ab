//! Single consumer of probe events.

use bp_traits::ResultSink;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, error};

use crate::pool::ProbeEvent;

/// What the aggregator delivered to the sink.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AggregateSummary {
    /// Results handed to [`ResultSink::report`]
    pub reported: u64,

    /// Diagnostics handed to [`ResultSink::diagnostic`]
    pub diagnostics: u64,

    /// Sink calls that returned an error
    pub sink_errors: u64,
}

/// Drain `events` into `sink` in arrival order, then flush it.
///
/// Returns only once the channel is closed and empty, i.e. after every
/// sender (one per worker) has been dropped.
pub async fn aggregate<S>(
    sink: &mut S,
    mut events: mpsc::UnboundedReceiver<ProbeEvent>,
) -> AggregateSummary
where
    S: ResultSink + ?Sized,
{
    let mut summary = AggregateSummary::default();

    while let Some(event) = events.recv().await {
        let delivered = match &event {
            ProbeEvent::Found(result) => {
                summary.reported += 1;
                sink.report(result).await
            }
            ProbeEvent::Diagnostic(diagnostic) => {
                summary.diagnostics += 1;
                sink.diagnostic(diagnostic).await
            }
        };

        if let Err(e) = delivered {
            summary.sink_errors += 1;
            error!(error = %e, event = ?event, "Sink rejected event");
        }
    }

    if let Err(e) = sink.flush().await {
        summary.sink_errors += 1;
        error!(error = %e, "Failed to flush sink");
    }

    debug!(
        reported = summary.reported,
        diagnostics = summary.diagnostics,
        "Result queue drained"
    );
    summary
}
