//! Forwarding to several sinks.

use async_trait::async_trait;
use bp_error::Result;
use bp_traits::{Diagnostic, ResultSink};
use bp_types::CheckResult;

/// Hands every event to each inner sink in order.
///
/// A failing sink does not stop the others; the first error is returned.
#[derive(Default)]
pub struct FanoutSink {
    sinks: Vec<Box<dyn ResultSink>>,
}

impl FanoutSink {
    /// Create a fanout with no sinks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sink.
    pub fn with(mut self, sink: impl ResultSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    /// Number of inner sinks.
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// Whether there are no inner sinks.
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

#[async_trait]
impl ResultSink for FanoutSink {
    async fn report(&mut self, result: &CheckResult) -> Result<()> {
        let mut first_error = None;
        for sink in &mut self.sinks {
            if let Err(e) = sink.report(result).await {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    async fn diagnostic(&mut self, diagnostic: &Diagnostic) -> Result<()> {
        let mut first_error = None;
        for sink in &mut self.sinks {
            if let Err(e) = sink.diagnostic(diagnostic).await {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    async fn flush(&mut self) -> Result<()> {
        let mut first_error = None;
        for sink in &mut self.sinks {
            if let Err(e) = sink.flush().await {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::CsvSink;
    use bp_error::BpError;
    use bp_types::Region;

    struct Failing;

    #[async_trait]
    impl ResultSink for Failing {
        async fn report(&mut self, _result: &CheckResult) -> Result<()> {
            Err(BpError::Sink("nope".to_string()))
        }

        async fn flush(&mut self) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_failure_does_not_starve_later_sinks() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut fanout = FanoutSink::new()
            .with(Failing)
            .with(CsvSink::create(file.path()).unwrap());
        assert_eq!(fanout.len(), 2);

        let result = CheckResult::found("foo", Region::from_static("us-west-2"), true, true);
        let err = fanout.report(&result).await.unwrap_err();
        assert!(matches!(err, BpError::Sink(_)));
        fanout.flush().await.unwrap();

        let text = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(text, "foo,us-west-2,true,true\n");
    }
}
