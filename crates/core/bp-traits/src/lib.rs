//! Core traits for bucketprobe.
//!
//! This crate defines the seams between the scan engine and the outside world:
//! - [`StorageClient`] - The storage service the prober talks to (S3, test stubs)
//! - [`ResultSink`] - Where discovered buckets and diagnostics are reported

pub mod sink;
pub mod storage;

pub use sink::*;
pub use storage::*;
