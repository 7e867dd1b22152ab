//! Configuration types for a scan.

use bp_error::ConfigError;
use bp_types::Region;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::generator::{CandidateSource, MutationPlan};
use crate::prober::{DEFAULT_WRITE_PAYLOAD, ProbeSettings};
use crate::retry::RetryConfig;
use crate::wordlist::Wordlist;

/// Default number of concurrent probe workers.
pub const DEFAULT_THREADS: usize = 100;

/// Region every candidate is first probed in.
pub const DEFAULT_INITIAL_REGION: &str = "us-west-2";

/// Configuration for the probe engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Number of concurrent probe workers; also the candidate queue capacity
    pub threads: usize,

    /// Region each candidate is first probed in
    pub initial_region: Region,

    /// Region direct location lookups are sent to
    pub location_region: Region,

    /// Whether to attempt a write into found buckets
    pub write_check: bool,

    /// Body of the write-probe object
    pub write_payload: String,

    /// Region redirects followed per probe
    pub max_region_redirects: u32,

    /// Backoff for throttled requests
    pub retry: RetryConfig,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            threads: DEFAULT_THREADS,
            initial_region: Region::from_static(DEFAULT_INITIAL_REGION),
            location_region: Region::from_static(DEFAULT_INITIAL_REGION),
            write_check: true,
            write_payload: DEFAULT_WRITE_PAYLOAD.to_string(),
            max_region_redirects: 1,
            retry: RetryConfig::default(),
        }
    }
}

impl ScanConfig {
    /// Create a new scan configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of workers.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Set the region candidates are first probed in.
    pub fn with_initial_region(mut self, region: impl Into<Region>) -> Self {
        self.initial_region = region.into();
        self
    }

    /// Set the region location lookups are sent to.
    pub fn with_location_region(mut self, region: impl Into<Region>) -> Self {
        self.location_region = region.into();
        self
    }

    /// Enable or disable the write probe.
    pub fn with_write_check(mut self, enabled: bool) -> Self {
        self.write_check = enabled;
        self
    }

    /// Set the write-probe body.
    pub fn with_write_payload(mut self, payload: impl Into<String>) -> Self {
        self.write_payload = payload.into();
        self
    }

    /// Set the number of region redirects followed per probe.
    pub fn with_max_region_redirects(mut self, redirects: u32) -> Self {
        self.max_region_redirects = redirects;
        self
    }

    /// Set the retry policy.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.threads == 0 {
            return Err(ConfigError::InvalidThreads(self.threads));
        }
        if self.initial_region.as_str().is_empty() || self.location_region.as_str().is_empty() {
            return Err(ConfigError::Invalid("region must not be empty".to_string()));
        }
        if self.retry.max_backoff_ms < self.retry.initial_backoff_ms {
            return Err(ConfigError::Invalid(
                "max backoff must not be below initial backoff".to_string(),
            ));
        }
        Ok(())
    }

    /// Settings handed to the prober.
    pub fn probe_settings(&self) -> ProbeSettings {
        ProbeSettings {
            write_payload: self
                .write_check
                .then(|| Bytes::from(self.write_payload.clone())),
            max_region_redirects: self.max_region_redirects,
            retry: self.retry.clone(),
        }
    }
}

/// Where candidates come from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Static wordlist, one bucket name per line
    pub wordlist: Option<PathBuf>,

    /// Domain to mutate
    pub domain: Option<String>,

    /// Mutation wordlist, required with `domain`
    pub mutations: Option<PathBuf>,

    /// Extra keywords mixed into every mutation
    pub keywords: Vec<String>,
}

impl SourceConfig {
    /// Create an empty source configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the static wordlist.
    pub fn with_wordlist(mut self, path: impl Into<PathBuf>) -> Self {
        self.wordlist = Some(path.into());
        self
    }

    /// Set the domain to mutate.
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Set the mutation wordlist.
    pub fn with_mutations(mut self, path: impl Into<PathBuf>) -> Self {
        self.mutations = Some(path.into());
        self
    }

    /// Set the keywords.
    pub fn with_keywords(mut self, keywords: Vec<String>) -> Self {
        self.keywords = keywords;
        self
    }

    /// Check that the flags make sense together, without touching the filesystem.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match (&self.domain, &self.mutations) {
            (Some(domain), None) => Err(ConfigError::MissingMutationList(domain.clone())),
            (None, Some(_)) => Err(ConfigError::Invalid(
                "a mutation wordlist requires a domain".to_string(),
            )),
            (None, None) if self.wordlist.is_none() => Err(ConfigError::NoSources),
            _ => Ok(()),
        }
    }

    /// Validate and open every configured source.
    ///
    /// All files are opened here, so a missing file fails the run before
    /// any worker starts.
    pub fn open(&self) -> Result<Vec<CandidateSource>, ConfigError> {
        self.validate()?;

        let mut sources = Vec::with_capacity(2);

        if let Some(path) = &self.wordlist {
            sources.push(CandidateSource::Wordlist(Wordlist::open(path)?));
        }

        if let (Some(domain), Some(path)) = (&self.domain, &self.mutations) {
            let plan = MutationPlan::new(domain.clone(), self.keywords.clone())?;
            let words = Wordlist::open(path)?;
            sources.push(CandidateSource::Mutations { plan, words });
        }

        Ok(sources)
    }
}
