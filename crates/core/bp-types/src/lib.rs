//! Shared data types for bucketprobe.
//!
//! This crate provides the core data types used throughout the scanner:
//! - [`Region`] and the static [`KNOWN_REGIONS`] table
//! - [`Candidate`] - A bucket name waiting to be probed
//! - [`CheckResult`] - A bucket confirmed to exist, with its permissions

mod candidate;
mod region;
mod result;

pub use candidate::Candidate;
pub use region::{DEFAULT_LOCATION_REGION, EU_LEGACY_REGION, KNOWN_REGIONS, Region};
pub use result::CheckResult;
