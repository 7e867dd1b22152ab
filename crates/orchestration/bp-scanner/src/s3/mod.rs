//! S3 adapter for the probe engine.
//!
//! - Client configuration with LocalStack support
//! - [`StorageClient`](bp_traits::StorageClient) implementation with
//!   per-region clients and error classification
//! - Optional unsigned HTTP pre-check

mod client;
mod http;
mod storage;

pub use client::{S3Config, create_region_client, load_sdk_config};
pub use http::{DEFAULT_PRECHECK_ENDPOINT, HttpPrecheck};
pub use storage::S3StorageClient;
