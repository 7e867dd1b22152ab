//! S3 client configuration and creation.

use aws_config::retry::RetryConfig as SdkRetryConfig;
use aws_config::timeout::TimeoutConfig;
use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_s3::Client;
use bp_types::Region;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for S3 access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct S3Config {
    /// Custom endpoint URL (for LocalStack)
    pub endpoint: Option<String>,

    /// Explicit AWS access key (optional)
    pub access_key: Option<String>,

    /// Explicit AWS secret key (optional)
    pub secret_key: Option<String>,

    /// Explicit session token (optional)
    pub session_token: Option<String>,

    /// AWS profile name (optional)
    pub profile: Option<String>,

    /// Send unsigned requests
    pub anonymous: bool,

    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,

    /// Read timeout in seconds
    pub read_timeout_secs: u64,

    /// Timeout for a single request attempt in seconds
    pub operation_timeout_secs: u64,

    /// Run an unsigned HTTP existence check before each listing
    pub http_precheck: bool,
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            endpoint: None,
            access_key: None,
            secret_key: None,
            session_token: None,
            profile: None,
            anonymous: false,
            connect_timeout_secs: 5,
            read_timeout_secs: 10,
            operation_timeout_secs: 20,
            http_precheck: false,
        }
    }
}

impl S3Config {
    /// Create a new S3Config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a custom endpoint (for LocalStack).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set explicit credentials.
    pub fn with_credentials(
        mut self,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        self.access_key = Some(access_key.into());
        self.secret_key = Some(secret_key.into());
        self
    }

    /// Set a session token to go with explicit credentials.
    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    /// Set the AWS profile.
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    /// Send unsigned requests.
    pub fn with_anonymous(mut self, anonymous: bool) -> Self {
        self.anonymous = anonymous;
        self
    }

    /// Set connect, read and per-attempt timeouts in seconds.
    pub fn with_timeouts(mut self, connect: u64, read: u64, operation: u64) -> Self {
        self.connect_timeout_secs = connect;
        self.read_timeout_secs = read;
        self.operation_timeout_secs = operation;
        self
    }

    /// Enable the unsigned HTTP pre-check.
    pub fn with_http_precheck(mut self, enabled: bool) -> Self {
        self.http_precheck = enabled;
        self
    }

    fn timeout_config(&self) -> TimeoutConfig {
        TimeoutConfig::builder()
            .connect_timeout(Duration::from_secs(self.connect_timeout_secs))
            .read_timeout(Duration::from_secs(self.read_timeout_secs))
            .operation_attempt_timeout(Duration::from_secs(self.operation_timeout_secs))
            .build()
    }
}

/// Load the shared SDK configuration every regional client is built from.
///
/// SDK retries are disabled; throttling is handled by the engine's own backoff.
pub async fn load_sdk_config(config: &S3Config) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest())
        .retry_config(SdkRetryConfig::disabled())
        .timeout_config(config.timeout_config());

    // Set custom endpoint if provided (for LocalStack)
    if let Some(endpoint) = &config.endpoint {
        loader = loader.endpoint_url(endpoint);
    }

    if config.anonymous {
        loader = loader.no_credentials();
    } else if let (Some(access_key), Some(secret_key)) = (&config.access_key, &config.secret_key)
    {
        let credentials = aws_sdk_s3::config::Credentials::new(
            access_key,
            secret_key,
            config.session_token.clone(),
            None,
            "bucketprobe",
        );
        loader = loader.credentials_provider(credentials);
    }

    if let Some(profile) = &config.profile {
        loader = loader.profile_name(profile);
    }

    loader.load().await
}

/// Build an S3 client bound to `region`.
pub fn create_region_client(sdk_config: &SdkConfig, config: &S3Config, region: &Region) -> Client {
    let builder = aws_sdk_s3::config::Builder::from(sdk_config)
        .region(aws_sdk_s3::config::Region::new(region.to_string()));

    // Path-style access for custom endpoints (LocalStack)
    let s3_config = if config.endpoint.is_some() {
        builder.force_path_style(true).build()
    } else {
        builder.build()
    };

    Client::from_conf(s3_config)
}
