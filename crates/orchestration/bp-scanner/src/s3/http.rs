//! Unsigned HTTP existence pre-check.
//!
//! A plain GET against the public endpoint answers "no such bucket" and
//! "slow down" without credentials. Only those two answers short-circuit the
//! signed request; everything else (including transport failures) falls
//! through, so the pre-check can save requests but never change an outcome.

use bp_error::{StorageError, StorageErrorKind};
use reqwest::StatusCode;
use reqwest::redirect::Policy;
use std::time::Duration;
use tracing::trace;

/// Public S3 endpoint used when no custom endpoint is configured.
pub const DEFAULT_PRECHECK_ENDPOINT: &str = "https://s3.amazonaws.com";

const PRECHECK_TIMEOUT: Duration = Duration::from_secs(3);

/// Issues unauthenticated path-style GETs for bucket roots.
#[derive(Debug, Clone)]
pub struct HttpPrecheck {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpPrecheck {
    /// Create a pre-check against `endpoint` (or the public S3 endpoint).
    pub fn new(endpoint: Option<&str>) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .redirect(Policy::none())
            .connect_timeout(PRECHECK_TIMEOUT)
            .timeout(PRECHECK_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint
                .unwrap_or(DEFAULT_PRECHECK_ENDPOINT)
                .trim_end_matches('/')
                .to_string(),
        })
    }

    /// URL of the bucket root.
    pub fn url_for(&self, bucket: &str) -> String {
        format!("{}/{}", self.endpoint, bucket)
    }

    /// Returns an error when the answer is conclusive, `None` otherwise.
    pub async fn check(&self, bucket: &str) -> Option<StorageError> {
        let response = match self.client.get(self.url_for(bucket)).send().await {
            Ok(response) => response,
            Err(e) => {
                trace!(bucket, error = %e, "Pre-check request failed");
                return None;
            }
        };

        let status = response.status();
        trace!(bucket, status = status.as_u16(), "Pre-check answered");
        conclusive(status)
    }
}

fn conclusive(status: StatusCode) -> Option<StorageError> {
    let kind = match status {
        StatusCode::NOT_FOUND => StorageErrorKind::NotFound,
        StatusCode::SERVICE_UNAVAILABLE => StorageErrorKind::RateLimited,
        _ => return None,
    };
    Some(StorageError::new(kind, "unsigned pre-check").with_status(status.as_u16()))
}
