//! [`StorageClient`] backed by `aws-sdk-s3`.

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use bp_error::StorageError;
use bp_traits::{StorageClient, StorageResult};
use bp_types::{KNOWN_REGIONS, Region};
use bytes::Bytes;
use std::collections::HashMap;
use tracing::debug;

use super::client::{S3Config, create_region_client, load_sdk_config};
use super::http::HttpPrecheck;

/// S3 storage client with one SDK client per region.
///
/// Clients for every known region are built up front and only read
/// afterwards, so all workers share them without locking.
pub struct S3StorageClient {
    sdk_config: SdkConfig,
    config: S3Config,
    clients: HashMap<Region, Client>,
    precheck: Option<HttpPrecheck>,
}

impl S3StorageClient {
    /// Load AWS configuration and build the regional clients.
    pub async fn new(config: S3Config) -> bp_error::Result<Self> {
        let sdk_config = load_sdk_config(&config).await;

        let precheck = if config.http_precheck {
            let precheck = HttpPrecheck::new(config.endpoint.as_deref())
                .map_err(|e| anyhow::anyhow!("failed to build pre-check client: {e}"))?;
            Some(precheck)
        } else {
            None
        };

        Ok(Self::from_sdk_config(sdk_config, config, precheck))
    }

    /// Build from an already loaded SDK configuration.
    pub fn from_sdk_config(
        sdk_config: SdkConfig,
        config: S3Config,
        precheck: Option<HttpPrecheck>,
    ) -> Self {
        let clients = KNOWN_REGIONS
            .iter()
            .map(|region| {
                (
                    region.clone(),
                    create_region_client(&sdk_config, &config, region),
                )
            })
            .collect::<HashMap<_, _>>();

        debug!(
            regions = clients.len(),
            endpoint = ?config.endpoint,
            anonymous = config.anonymous,
            precheck = precheck.is_some(),
            "S3 clients ready"
        );

        Self {
            sdk_config,
            config,
            clients,
            precheck,
        }
    }

    /// Client for `region`, built on demand for regions outside the table.
    fn client(&self, region: &Region) -> Client {
        match self.clients.get(region) {
            Some(client) => client.clone(),
            None => {
                debug!(region = %region, "Building client for unlisted region");
                create_region_client(&self.sdk_config, &self.config, region)
            }
        }
    }
}

#[async_trait]
impl StorageClient for S3StorageClient {
    async fn list_empty(&self, bucket: &str, region: &Region) -> StorageResult<()> {
        self.client(region)
            .list_objects()
            .bucket(bucket)
            .max_keys(0)
            .send()
            .await
            .map(|_| ())
            .map_err(classify_sdk_error)
    }

    async fn bucket_location(
        &self,
        bucket: &str,
        region: &Region,
    ) -> StorageResult<Option<String>> {
        let output = self
            .client(region)
            .get_bucket_location()
            .bucket(bucket)
            .send()
            .await
            .map_err(classify_sdk_error)?;

        Ok(output
            .location_constraint()
            .map(|constraint| constraint.as_str().to_string()))
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        payload: Bytes,
        region: &Region,
    ) -> StorageResult<()> {
        self.client(region)
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(payload))
            .send()
            .await
            .map(|_| ())
            .map_err(classify_sdk_error)
    }

    async fn precheck(&self, bucket: &str) -> StorageResult<()> {
        match &self.precheck {
            Some(precheck) => precheck.check(bucket).await.map_or(Ok(()), Err),
            None => Ok(()),
        }
    }
}

/// Translate an SDK failure into the engine's error vocabulary.
fn classify_sdk_error<E>(err: SdkError<E, HttpResponse>) -> StorageError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
{
    let status = err.raw_response().map(|r| r.status().as_u16());
    let service = err.as_service_error();
    let code = service.and_then(|e| e.code());
    let message = service
        .and_then(|e| e.message())
        .map(str::to_string)
        .unwrap_or_else(|| DisplayErrorContext(&err).to_string());

    StorageError::from_wire(code, status, message)
}
