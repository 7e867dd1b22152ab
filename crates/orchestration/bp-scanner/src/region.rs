//! Region resolution for buckets that live outside the probed region.

use bp_error::{StorageError, StorageErrorKind};
use bp_traits::StorageClient;
use bp_types::{KNOWN_REGIONS, Region};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, trace};

use crate::retry::{RetryBudget, RetryConfig, with_backoff};

/// Why a bucket's region could not be determined.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The location lookup failed with something other than access denied
    #[error("location lookup failed: {0}")]
    LookupFailed(StorageError),

    /// No region matched, and at least one was still throttled after backoff
    #[error("region search throttled: {0}")]
    RateLimited(StorageError),

    /// No region in the table accepted a listing request
    #[error("no region found")]
    NoRegionMatched,
}

/// Finds the region a bucket actually lives in.
///
/// First asks the service directly. If that request is refused, every region
/// in [`KNOWN_REGIONS`] is tried in order with a zero-result listing; the
/// first one that answers with success or access denied is the bucket's
/// home, since a misrouted request is answered with a redirect instead.
///
/// Holds no mutable state, so one resolver serves all workers.
pub struct RegionResolver<C: StorageClient> {
    client: Arc<C>,
    location_region: Region,
    retry: RetryConfig,
}

impl<C: StorageClient> RegionResolver<C> {
    /// Create a resolver that sends location lookups to `location_region`.
    pub fn new(client: Arc<C>, location_region: Region, retry: RetryConfig) -> Self {
        Self {
            client,
            location_region,
            retry,
        }
    }

    /// Region the direct lookup is sent to.
    pub fn location_region(&self) -> &Region {
        &self.location_region
    }

    /// Determine the region of `bucket`.
    pub async fn resolve(
        &self,
        bucket: &str,
        budget: &mut RetryBudget,
    ) -> Result<Region, ResolveError> {
        let lookup = with_backoff(&self.retry, budget, "get_bucket_location", || {
            self.client.bucket_location(bucket, &self.location_region)
        })
        .await;

        match lookup {
            Ok(constraint) => {
                let region = Region::from_location_constraint(constraint.as_deref());
                debug!(
                    bucket,
                    region = %region,
                    "Location lookup succeeded"
                );
                Ok(region)
            }
            Err(e) if e.kind == StorageErrorKind::AccessDenied => {
                debug!(bucket, "Location lookup denied, brute-forcing region");
                self.brute_force(bucket, budget).await
            }
            Err(e) => {
                debug!(bucket, error = %e, "Location lookup failed");
                Err(ResolveError::LookupFailed(e))
            }
        }
    }

    /// Try every known region in order.
    ///
    /// A region that stays throttled cannot be ruled out, so an exhausted
    /// search that skipped one reports the throttle instead of no match.
    async fn brute_force(
        &self,
        bucket: &str,
        budget: &mut RetryBudget,
    ) -> Result<Region, ResolveError> {
        let mut throttled = None;

        for region in KNOWN_REGIONS.iter() {
            let outcome = with_backoff(&self.retry, budget, "list_objects", || {
                self.client.list_empty(bucket, region)
            })
            .await;

            match outcome {
                Ok(()) => return Ok(region.clone()),
                Err(StorageError {
                    kind: StorageErrorKind::AccessDenied,
                    ..
                }) => return Ok(region.clone()),
                Err(e) if e.kind == StorageErrorKind::RateLimited => {
                    debug!(bucket, region = %region, "Region still throttled, skipping");
                    throttled.get_or_insert(e);
                }
                Err(e) => {
                    trace!(bucket, region = %region, error = %e, "Region rejected");
                }
            }
        }

        Err(throttled.map_or(ResolveError::NoRegionMatched, ResolveError::RateLimited))
    }
}
