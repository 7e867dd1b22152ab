//! The per-candidate probe state machine.
//!
//! ```text
//! Precheck (once)
//!   not found     -> NotFound
//!   rate limited  -> Abandoned (after backoff)
//!   otherwise     -> ExistenceCheck(initial)
//! ExistenceCheck(region)
//!   ok            -> WritabilityProbe(listable)  -> Found
//!   access denied -> WritabilityProbe(!listable) -> Found
//!   not found     -> NotFound
//!   wrong region  -> RegionResolve -> ExistenceCheck(resolved)   (bounded)
//!   rate limited  -> Abandoned (after backoff)
//!   other         -> Abandoned
//! ```

use bp_error::{StorageError, StorageErrorKind};
use bp_traits::{Diagnostic, DiagnosticKind, StorageClient};
use bp_types::{CheckResult, Region};
use bytes::Bytes;
use std::sync::Arc;
use tracing::{debug, trace, warn};
use uuid::Uuid;

use crate::region::{RegionResolver, ResolveError};
use crate::retry::{RetryBudget, RetryConfig, with_backoff};

/// Body of the throwaway object written by the write probe.
pub const DEFAULT_WRITE_PAYLOAD: &str = "bucketprobe write check\n";

/// Knobs for [`Prober`].
#[derive(Debug, Clone)]
pub struct ProbeSettings {
    /// Payload for the write probe; `None` skips it and reports `writable = false`
    pub write_payload: Option<Bytes>,

    /// Region redirects followed per probe before giving up
    pub max_region_redirects: u32,

    /// Backoff policy for throttled requests
    pub retry: RetryConfig,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            write_payload: Some(Bytes::from_static(DEFAULT_WRITE_PAYLOAD.as_bytes())),
            max_region_redirects: 1,
            retry: RetryConfig::default(),
        }
    }
}

/// How a single probe ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The bucket exists
    Found(CheckResult),

    /// The bucket does not exist
    NotFound,

    /// The probe was given up without an answer
    Abandoned(Diagnostic),
}

/// Probes candidates against a storage service.
///
/// Shared by all workers; every call is independent.
pub struct Prober<C: StorageClient> {
    client: Arc<C>,
    resolver: RegionResolver<C>,
    settings: ProbeSettings,
}

impl<C: StorageClient> Prober<C> {
    /// Create a prober whose region lookups go to `location_region`.
    pub fn new(client: Arc<C>, location_region: Region, settings: ProbeSettings) -> Self {
        let resolver = RegionResolver::new(client.clone(), location_region, settings.retry.clone());
        Self {
            client,
            resolver,
            settings,
        }
    }

    /// Probe settings in effect.
    pub fn settings(&self) -> &ProbeSettings {
        &self.settings
    }

    /// Probe `name`, starting in `initial_region`.
    pub async fn probe(
        &self,
        name: &str,
        initial_region: &Region,
        budget: &mut RetryBudget,
    ) -> ProbeOutcome {
        let precheck = with_backoff(&self.settings.retry, budget, "precheck", || {
            self.client.precheck(name)
        })
        .await;
        if let Err(e) = precheck {
            match e.kind {
                StorageErrorKind::NotFound => {
                    trace!(bucket = name, "Pre-check found no bucket");
                    return ProbeOutcome::NotFound;
                }
                StorageErrorKind::RateLimited => {
                    return abandon(
                        DiagnosticKind::RateLimited,
                        name,
                        initial_region.clone(),
                        Some(&e),
                        "retry budget exhausted",
                    );
                }
                _ => trace!(bucket = name, error = %e, "Pre-check inconclusive"),
            }
        }

        let mut region = initial_region.clone();
        let mut redirects = 0;

        loop {
            let existence = with_backoff(&self.settings.retry, budget, "list_objects", || {
                self.client.list_empty(name, &region)
            })
            .await;

            let listable = match existence {
                Ok(()) => true,
                Err(e) => match e.kind {
                    StorageErrorKind::AccessDenied => false,
                    StorageErrorKind::NotFound => {
                        trace!(bucket = name, region = %region, "Bucket does not exist");
                        return ProbeOutcome::NotFound;
                    }
                    StorageErrorKind::WrongRegion => {
                        if redirects >= self.settings.max_region_redirects {
                            return abandon(
                                DiagnosticKind::RegionUnresolved,
                                name,
                                region,
                                Some(&e),
                                "redirected again after region resolution",
                            );
                        }

                        match self.resolver.resolve(name, budget).await {
                            Ok(resolved) => {
                                debug!(
                                    bucket = name,
                                    from = %region,
                                    to = %resolved,
                                    "Following region redirect"
                                );
                                redirects += 1;
                                region = resolved;
                                continue;
                            }
                            Err(ResolveError::LookupFailed(cause)) => {
                                return abandon(
                                    DiagnosticKind::RegionUnresolved,
                                    name,
                                    region,
                                    Some(&cause),
                                    "location lookup failed",
                                );
                            }
                            Err(ResolveError::RateLimited(cause)) => {
                                return abandon(
                                    DiagnosticKind::RateLimited,
                                    name,
                                    region,
                                    Some(&cause),
                                    "region search throttled",
                                );
                            }
                            Err(ResolveError::NoRegionMatched) => {
                                return abandon(
                                    DiagnosticKind::RegionUnresolved,
                                    name,
                                    region,
                                    None,
                                    "no region found",
                                );
                            }
                        }
                    }
                    StorageErrorKind::RateLimited => {
                        return abandon(
                            DiagnosticKind::RateLimited,
                            name,
                            region,
                            Some(&e),
                            "retry budget exhausted",
                        );
                    }
                    StorageErrorKind::Other => {
                        let message = e.message.clone();
                        return abandon(DiagnosticKind::ProbeFailed, name, region, Some(&e), message);
                    }
                },
            };

            let writable = self.check_writable(name, &region).await;
            debug!(bucket = name, region = %region, listable, writable, "Bucket found");
            return ProbeOutcome::Found(CheckResult::found(name, region, listable, writable));
        }
    }

    /// Try to write a uniquely named object. Any failure means not writable.
    async fn check_writable(&self, name: &str, region: &Region) -> bool {
        let Some(payload) = &self.settings.write_payload else {
            return false;
        };

        let key = Uuid::new_v4().to_string();
        match self
            .client
            .put_object(name, &key, payload.clone(), region)
            .await
        {
            Ok(()) => {
                debug!(bucket = name, key = %key, "Write probe succeeded");
                true
            }
            Err(e) => {
                trace!(bucket = name, error = %e, "Write probe refused");
                false
            }
        }
    }
}

fn abandon(
    kind: DiagnosticKind,
    name: &str,
    region: Region,
    cause: Option<&StorageError>,
    message: impl Into<String>,
) -> ProbeOutcome {
    let mut diagnostic = Diagnostic::new(kind, name, region, message);
    if let Some(cause) = cause {
        diagnostic = diagnostic.with_code(cause.raw_code());
    }

    warn!(
        bucket = %diagnostic.bucket,
        region = %diagnostic.region,
        code = diagnostic.code.as_deref().unwrap_or("-"),
        "{}: {}",
        diagnostic.kind,
        diagnostic.message
    );
    ProbeOutcome::Abandoned(diagnostic)
}
