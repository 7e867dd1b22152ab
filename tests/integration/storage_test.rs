//! S3 adapter integration tests using LocalStack.
//!
//! These check that real service responses are classified the way the
//! probe state machine expects.

use crate::common::{LocalStackTestContext, unique_name};
use bp_error::StorageErrorKind;
use bp_scanner::S3StorageClient;
use bp_traits::StorageClient;
use bp_types::Region;

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_missing_bucket_is_not_found() {
    let ctx = LocalStackTestContext::new().await;

    if !ctx.is_available().await {
        eprintln!("LocalStack not available, skipping test");
        return;
    }

    let storage = S3StorageClient::new(ctx.adapter_config()).await.unwrap();
    let err = storage
        .list_empty(&unique_name("missing"), &Region::new(&ctx.region))
        .await
        .unwrap_err();

    assert_eq!(err.kind, StorageErrorKind::NotFound);
    assert_eq!(err.code.as_deref(), Some("NoSuchBucket"));
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_existing_bucket_lists_and_accepts_writes() {
    let ctx = LocalStackTestContext::new().await;

    if !ctx.is_available().await {
        eprintln!("LocalStack not available, skipping test");
        return;
    }

    let bucket = unique_name("bp-exists");
    ctx.create_bucket(&bucket).await.unwrap();

    let storage = S3StorageClient::new(ctx.adapter_config()).await.unwrap();
    let region = Region::new(&ctx.region);

    storage.list_empty(&bucket, &region).await.unwrap();
    storage
        .put_object(&bucket, "probe", "x".into(), &region)
        .await
        .unwrap();
    assert_eq!(ctx.object_count(&bucket).await.unwrap(), 1);
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_location_of_default_region_bucket() {
    let ctx = LocalStackTestContext::new().await;

    if !ctx.is_available().await {
        eprintln!("LocalStack not available, skipping test");
        return;
    }

    let bucket = unique_name("bp-location");
    ctx.create_bucket(&bucket).await.unwrap();

    let storage = S3StorageClient::new(ctx.adapter_config()).await.unwrap();
    let constraint = storage
        .bucket_location(&bucket, &Region::new(&ctx.region))
        .await
        .unwrap();

    let region = Region::from_location_constraint(constraint.as_deref());
    assert_eq!(region.as_str(), "us-east-1");
}
