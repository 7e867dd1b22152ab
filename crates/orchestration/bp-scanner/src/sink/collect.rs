//! In-memory sink.

use async_trait::async_trait;
use bp_error::Result;
use bp_traits::{Diagnostic, ResultSink};
use bp_types::CheckResult;

/// Keeps every result and diagnostic it is given.
#[derive(Debug, Default)]
pub struct CollectingSink {
    results: Vec<CheckResult>,
    diagnostics: Vec<Diagnostic>,
    flushed: bool,
}

impl CollectingSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Results in the order they were reported.
    pub fn results(&self) -> &[CheckResult] {
        &self.results
    }

    /// Names of the reported buckets, in order.
    pub fn names(&self) -> Vec<&str> {
        self.results.iter().map(|r| r.name.as_str()).collect()
    }

    /// Diagnostics in the order they were reported.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Whether [`ResultSink::flush`] has been called.
    pub fn is_flushed(&self) -> bool {
        self.flushed
    }

    /// Take the collected results.
    pub fn into_results(self) -> Vec<CheckResult> {
        self.results
    }
}

#[async_trait]
impl ResultSink for CollectingSink {
    async fn report(&mut self, result: &CheckResult) -> Result<()> {
        self.results.push(result.clone());
        Ok(())
    }

    async fn diagnostic(&mut self, diagnostic: &Diagnostic) -> Result<()> {
        self.diagnostics.push(diagnostic.clone());
        Ok(())
    }

    async fn flush(&mut self) -> Result<()> {
        self.flushed = true;
        Ok(())
    }
}
