//! Result sink trait and diagnostic types.

use async_trait::async_trait;
use bp_error::Result;
use bp_types::{CheckResult, Region};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a probe was abandoned without a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// The service kept throttling us and the retry budget ran out
    RateLimited,

    /// The bucket exists elsewhere but its region could not be determined
    RegionUnresolved,

    /// An unclassified or transport error
    ProbeFailed,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RateLimited => write!(f, "rate limited"),
            Self::RegionUnresolved => write!(f, "region unresolved"),
            Self::ProbeFailed => write!(f, "probe failed"),
        }
    }
}

/// A non-fatal problem encountered while probing one candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// What went wrong
    pub kind: DiagnosticKind,

    /// Candidate bucket name
    pub bucket: String,

    /// Region the failing request was sent to
    pub region: Region,

    /// Raw error classification (provider code, HTTP status or kind)
    pub code: Option<String>,

    /// Human-readable detail
    pub message: String,
}

impl Diagnostic {
    /// Create a diagnostic.
    pub fn new(
        kind: DiagnosticKind,
        bucket: impl Into<String>,
        region: Region,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            bucket: bucket.into(),
            region,
            code: None,
            message: message.into(),
        }
    }

    /// Attach the raw error classification.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] bucket: {} region: {}", self.kind, self.bucket, self.region)?;
        if let Some(code) = &self.code {
            write!(f, " code: {code}")?;
        }
        write!(f, " ({})", self.message)
    }
}

/// Trait for reporting discovered buckets.
///
/// A sink is owned by exactly one aggregator task, so implementations get
/// `&mut self` and need no internal locking.
#[async_trait]
pub trait ResultSink: Send {
    /// Report a discovered bucket. Called exactly once per emitted result.
    async fn report(&mut self, result: &CheckResult) -> Result<()>;

    /// Report a probe that was abandoned. Ignored by default.
    async fn diagnostic(&mut self, _diagnostic: &Diagnostic) -> Result<()> {
        Ok(())
    }

    /// Flush any buffered output.
    ///
    /// Called once after the last result has been reported.
    async fn flush(&mut self) -> Result<()>;
}

#[async_trait]
impl<S: ResultSink + ?Sized> ResultSink for Box<S> {
    async fn report(&mut self, result: &CheckResult) -> Result<()> {
        (**self).report(result).await
    }

    async fn diagnostic(&mut self, diagnostic: &Diagnostic) -> Result<()> {
        (**self).diagnostic(diagnostic).await
    }

    async fn flush(&mut self) -> Result<()> {
        (**self).flush().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_display() {
        let diagnostic = Diagnostic::new(
            DiagnosticKind::ProbeFailed,
            "foo",
            Region::from_static("us-west-2"),
            "connection reset",
        )
        .with_code("InternalError");

        let text = diagnostic.to_string();
        assert!(text.contains("probe failed"));
        assert!(text.contains("bucket: foo"));
        assert!(text.contains("region: us-west-2"));
        assert!(text.contains("code: InternalError"));
    }
}
