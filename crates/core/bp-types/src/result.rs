//! Probe results.

use serde::{Deserialize, Serialize};

use crate::Region;

/// A bucket confirmed to exist, with what we were allowed to do with it.
///
/// Only ever constructed for buckets that exist. `listable == false` means
/// existence was proven through an access-denied response. `writable` is
/// `false` both for a refused write and for an unattempted one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    /// Bucket name
    pub name: String,

    /// Region the bucket was found in
    pub region: Region,

    /// Always true for emitted results
    pub exists: bool,

    /// The zero-result listing succeeded
    pub listable: bool,

    /// The write probe succeeded
    pub writable: bool,
}

impl CheckResult {
    /// Create a result for an existing bucket.
    pub fn found(name: impl Into<String>, region: Region, listable: bool, writable: bool) -> Self {
        Self {
            name: name.into(),
            region,
            exists: true,
            listable,
            writable,
        }
    }

    /// The record shape written to log files: `name,region,listable,writable`.
    pub fn csv_record(&self) -> [String; 4] {
        [
            self.name.clone(),
            self.region.to_string(),
            self.listable.to_string(),
            self.writable.to_string(),
        ]
    }
}
