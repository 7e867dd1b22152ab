//! Storage service capability trait.

use async_trait::async_trait;
use bp_error::StorageError;
use bp_types::Region;
use bytes::Bytes;

/// Result of a single storage request.
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Trait for storage service clients.
///
/// The prober needs three requests from the service, plus an optional
/// pre-check. Failures come back
/// as a [`StorageError`] whose [`kind`](StorageError::kind) has already been
/// classified by the adapter, so the prober never sees provider wire codes.
///
/// Implementations must be safe to call concurrently from many workers.
///
/// # Implementations
///
/// - S3 adapter built on `aws-sdk-s3`
/// - Scripted in-memory stubs for tests
#[async_trait]
pub trait StorageClient: Send + Sync {
    /// Issues a zero-result listing of `bucket` against `region`.
    ///
    /// `Ok(())` means the bucket exists and may be listed.
    async fn list_empty(&self, bucket: &str, region: &Region) -> StorageResult<()>;

    /// Asks the service for the bucket's location constraint, sending the
    /// request to `region`.
    ///
    /// Returns the raw constraint; `None` or an empty string mean the
    /// provider's default region.
    async fn bucket_location(&self, bucket: &str, region: &Region)
    -> StorageResult<Option<String>>;

    /// Writes `payload` under `key` into `bucket` in `region`.
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        payload: Bytes,
        region: &Region,
    ) -> StorageResult<()>;

    /// Cheap region-independent existence check, run once per probe before
    /// the first listing.
    ///
    /// An error short-circuits the probe; `Ok(())` means inconclusive. The
    /// default never short-circuits.
    async fn precheck(&self, _bucket: &str) -> StorageResult<()> {
        Ok(())
    }
}

#[async_trait]
impl<T: StorageClient + ?Sized> StorageClient for std::sync::Arc<T> {
    async fn list_empty(&self, bucket: &str, region: &Region) -> StorageResult<()> {
        (**self).list_empty(bucket, region).await
    }

    async fn bucket_location(
        &self,
        bucket: &str,
        region: &Region,
    ) -> StorageResult<Option<String>> {
        (**self).bucket_location(bucket, region).await
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        payload: Bytes,
        region: &Region,
    ) -> StorageResult<()> {
        (**self).put_object(bucket, key, payload, region).await
    }

    async fn precheck(&self, bucket: &str) -> StorageResult<()> {
        (**self).precheck(bucket).await
    }
}
