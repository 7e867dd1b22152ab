//! Storage regions.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// A storage-service region identifier (e.g. `us-west-2`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Region(Cow<'static, str>);

/// Region implied by an empty location constraint ("US Standard").
pub const DEFAULT_LOCATION_REGION: Region = Region::from_static("us-east-1");

/// Region the legacy `EU` location constraint refers to.
pub const EU_LEGACY_REGION: Region = Region::from_static("eu-west-1");

/// Regions tried, in this order, when brute-forcing a bucket's location.
pub static KNOWN_REGIONS: [Region; 17] = [
    Region::from_static("us-east-2"),
    Region::from_static("us-east-1"),
    Region::from_static("us-west-1"),
    Region::from_static("us-west-2"),
    Region::from_static("ca-central-1"),
    Region::from_static("ap-south-1"),
    Region::from_static("ap-northeast-2"),
    Region::from_static("ap-southeast-1"),
    Region::from_static("ap-southeast-2"),
    Region::from_static("ap-northeast-1"),
    Region::from_static("eu-central-1"),
    Region::from_static("eu-west-1"),
    Region::from_static("eu-west-2"),
    Region::from_static("sa-east-1"),
    Region::from_static("eu-west-3"),
    Region::from_static("eu-north-1"),
    Region::from_static("ap-northeast-3"),
];

impl Region {
    /// Create a region from a static identifier.
    pub const fn from_static(id: &'static str) -> Self {
        Self(Cow::Borrowed(id))
    }

    /// Create a region from an owned identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(Cow::Owned(id.into()))
    }

    /// Map a bucket location constraint to a concrete region.
    ///
    /// An absent or empty constraint means `us-east-1`,
    /// and the legacy `EU` constraint means `eu-west-1`.
    pub fn from_location_constraint(constraint: Option<&str>) -> Self {
        match constraint.map(str::trim) {
            None | Some("") => DEFAULT_LOCATION_REGION,
            Some("EU") => EU_LEGACY_REGION,
            Some(other) => Self::new(other),
        }
    }

    /// The region identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this region is part of the brute-force table.
    pub fn is_known(&self) -> bool {
        KNOWN_REGIONS.iter().any(|r| r == self)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Region {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for Region {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

impl AsRef<str> for Region {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
