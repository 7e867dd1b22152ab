//! LocalStack test context and utilities.

use aws_sdk_s3::Client as S3Client;
use bp_scanner::S3Config;
use std::time::{SystemTime, UNIX_EPOCH};

/// LocalStack test context providing an admin S3 client.
pub struct LocalStackTestContext {
    pub s3: S3Client,
    pub endpoint: String,
    pub region: String,
}

impl LocalStackTestContext {
    /// Create a new LocalStack test context.
    ///
    /// Uses the `LOCALSTACK_ENDPOINT` environment variable if set,
    /// otherwise defaults to `http://localhost:4566`.
    pub async fn new() -> Self {
        let endpoint = std::env::var("LOCALSTACK_ENDPOINT")
            .unwrap_or_else(|_| "http://localhost:4566".to_string());
        let region = "us-east-1".to_string();

        let credentials =
            aws_sdk_s3::config::Credentials::new("test", "test", None, None, "localstack");
        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_sdk_s3::config::Region::new(region.clone()))
            .endpoint_url(&endpoint)
            .credentials_provider(credentials)
            .load()
            .await;

        let s3_config = aws_sdk_s3::config::Builder::from(&config)
            .force_path_style(true)
            .build();

        Self {
            s3: S3Client::from_conf(s3_config),
            endpoint,
            region,
        }
    }

    /// Check if LocalStack is available and healthy.
    pub async fn is_available(&self) -> bool {
        // Fails quickly if LocalStack isn't running
        self.s3.list_buckets().send().await.is_ok()
    }

    /// Adapter configuration pointing at the same LocalStack.
    pub fn adapter_config(&self) -> S3Config {
        S3Config::new()
            .with_endpoint(&self.endpoint)
            .with_credentials("test", "test")
            .with_timeouts(2, 5, 10)
    }

    /// Create an S3 bucket for testing.
    pub async fn create_bucket(&self, name: &str) -> Result<(), aws_sdk_s3::Error> {
        let buckets = self.s3.list_buckets().send().await?;
        let exists = buckets
            .buckets()
            .iter()
            .any(|b| b.name().unwrap_or_default() == name);

        if !exists {
            self.s3.create_bucket().bucket(name).send().await?;
        }
        Ok(())
    }

    /// Number of objects in a bucket.
    pub async fn object_count(&self, bucket: &str) -> Result<usize, aws_sdk_s3::Error> {
        let output = self.s3.list_objects_v2().bucket(bucket).send().await?;
        Ok(output.contents().len())
    }
}

/// A bucket name that will not collide across test runs.
pub fn unique_name(prefix: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    format!("{prefix}-{nanos}")
}
