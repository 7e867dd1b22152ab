//! Error types and classification for bucketprobe.
//!
//! This crate provides:
//! - [`BpError`] - Top-level error enum for a scan run
//! - [`ConfigError`] - Pre-flight configuration failures (always fatal)
//! - [`StorageError`] - A failed storage-service request, carrying its [`StorageErrorKind`]
//! - [`classify_code`] - Maps provider wire codes and HTTP statuses onto [`StorageErrorKind`]

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for bucketprobe.
#[derive(Error, Debug)]
pub enum BpError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Storage service errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Result sink errors (console, log file)
    #[error("Sink error: {0}")]
    Sink(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors (wrapped anyhow)
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Configuration errors. All of these abort the run before any worker starts.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Neither a wordlist nor a domain was supplied
    #[error("no candidate source: supply a wordlist and/or a domain with a mutation list")]
    NoSources,

    /// A domain was supplied without a mutation wordlist
    #[error("domain '{0}' was supplied but no mutation wordlist was given")]
    MissingMutationList(String),

    /// Concurrency width below one
    #[error("thread count must be at least 1, got {0}")]
    InvalidThreads(usize),

    /// A required file could not be opened
    #[error("cannot read '{}': {reason}", .path.display())]
    Unreadable { path: PathBuf, reason: String },

    /// Any other invalid setting
    #[error("{0}")]
    Invalid(String),
}

/// Classification of a failed storage request.
///
/// This is the closed vocabulary the prober's state machine works with;
/// adapters translate their provider's wire codes into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageErrorKind {
    /// The container does not exist
    NotFound,

    /// The container exists but lives in another region
    WrongRegion,

    /// The request reached the container but was refused
    AccessDenied,

    /// The service is throttling us
    RateLimited,

    /// Anything else (transport failures, unexpected codes)
    Other,
}

impl std::fmt::Display for StorageErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "NotFound"),
            Self::WrongRegion => write!(f, "WrongRegion"),
            Self::AccessDenied => write!(f, "AccessDenied"),
            Self::RateLimited => write!(f, "RateLimited"),
            Self::Other => write!(f, "Other"),
        }
    }
}

/// A failed storage-service request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} ({}): {message}", .code.as_deref().unwrap_or("no code"))]
pub struct StorageError {
    /// Classified kind
    pub kind: StorageErrorKind,

    /// Raw provider error code, if the response carried one
    pub code: Option<String>,

    /// HTTP status, if a response was received at all
    pub status: Option<u16>,

    /// Human-readable detail
    pub message: String,
}

impl StorageError {
    /// Create an error of the given kind with no wire details.
    pub fn new(kind: StorageErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: None,
            status: None,
            message: message.into(),
        }
    }

    /// Build an error from a raw provider code and status, classifying it.
    pub fn from_wire(code: Option<&str>, status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            kind: classify_code(code, status),
            code: code.map(str::to_string),
            status,
            message: message.into(),
        }
    }

    /// Attach a raw provider code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Attach an HTTP status.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Shorthand for an access-denied error.
    pub fn access_denied() -> Self {
        Self::new(StorageErrorKind::AccessDenied, "access denied").with_code("AccessDenied")
    }

    /// Shorthand for a not-found error.
    pub fn not_found() -> Self {
        Self::new(StorageErrorKind::NotFound, "bucket does not exist").with_code("NoSuchBucket")
    }

    /// Shorthand for a wrong-region error.
    pub fn wrong_region() -> Self {
        Self::new(StorageErrorKind::WrongRegion, "bucket is in another region")
            .with_code("PermanentRedirect")
    }

    /// Shorthand for a throttling error.
    pub fn rate_limited() -> Self {
        Self::new(StorageErrorKind::RateLimited, "request rate exceeded").with_code("SlowDown")
    }

    /// Raw code for diagnostics, falling back to the kind.
    pub fn raw_code(&self) -> String {
        match (&self.code, self.status) {
            (Some(code), _) => code.clone(),
            (None, Some(status)) => format!("HTTP {status}"),
            (None, None) => self.kind.to_string(),
        }
    }
}

/// Classify a provider error code and/or HTTP status.
///
/// The code wins when present. A bare status is only used when the response
/// body could not be decoded (HEAD-like responses, redirects).
pub fn classify_code(code: Option<&str>, status: Option<u16>) -> StorageErrorKind {
    if let Some(code) = code {
        match code {
            "NoSuchBucket" => return StorageErrorKind::NotFound,
            "PermanentRedirect"
            | "BucketRegionError"
            | "AuthorizationHeaderMalformed"
            | "IllegalLocationConstraintException"
            | "TemporaryRedirect" => return StorageErrorKind::WrongRegion,
            "AccessDenied" | "AllAccessDisabled" => return StorageErrorKind::AccessDenied,
            "SlowDown" | "RequestLimitExceeded" | "TooManyRequests" | "Throttling"
            | "ThrottlingException" => return StorageErrorKind::RateLimited,
            _ => {}
        }
    }

    match status {
        Some(301) | Some(307) => StorageErrorKind::WrongRegion,
        Some(429) | Some(503) => StorageErrorKind::RateLimited,
        Some(404) if code.is_none() => StorageErrorKind::NotFound,
        Some(403) if code.is_none() => StorageErrorKind::AccessDenied,
        _ => StorageErrorKind::Other,
    }
}

/// Result type alias using BpError.
pub type Result<T> = std::result::Result<T, BpError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_codes() {
        assert_eq!(classify_code(Some("NoSuchBucket"), Some(404)), StorageErrorKind::NotFound);
        assert_eq!(
            classify_code(Some("PermanentRedirect"), Some(301)),
            StorageErrorKind::WrongRegion
        );
        assert_eq!(
            classify_code(Some("BucketRegionError"), None),
            StorageErrorKind::WrongRegion
        );
        assert_eq!(classify_code(Some("AccessDenied"), Some(403)), StorageErrorKind::AccessDenied);
        assert_eq!(classify_code(Some("SlowDown"), Some(503)), StorageErrorKind::RateLimited);
        assert_eq!(
            classify_code(Some("RequestLimitExceeded"), None),
            StorageErrorKind::RateLimited
        );
    }

    #[test]
    fn test_classify_bare_status() {
        assert_eq!(classify_code(None, Some(301)), StorageErrorKind::WrongRegion);
        assert_eq!(classify_code(None, Some(404)), StorageErrorKind::NotFound);
        assert_eq!(classify_code(None, Some(403)), StorageErrorKind::AccessDenied);
        assert_eq!(classify_code(None, Some(503)), StorageErrorKind::RateLimited);
        assert_eq!(classify_code(None, Some(500)), StorageErrorKind::Other);
        assert_eq!(classify_code(None, None), StorageErrorKind::Other);
    }

    #[test]
    fn test_unknown_code_is_other() {
        assert_eq!(
            classify_code(Some("InvalidBucketName"), Some(400)),
            StorageErrorKind::Other
        );
        // An unrecognised code on a 404 is not silently treated as a missing bucket
        assert_eq!(classify_code(Some("NoSuchKey"), Some(404)), StorageErrorKind::Other);
    }

    #[test]
    fn test_storage_error_display() {
        let error = StorageError::from_wire(Some("AccessDenied"), Some(403), "Access Denied");
        assert_eq!(error.kind, StorageErrorKind::AccessDenied);
        assert!(error.to_string().contains("AccessDenied"));
        assert!(error.to_string().contains("Access Denied"));
    }

    #[test]
    fn test_raw_code_fallbacks() {
        assert_eq!(StorageError::not_found().raw_code(), "NoSuchBucket");
        assert_eq!(
            StorageError::new(StorageErrorKind::Other, "boom").with_status(500).raw_code(),
            "HTTP 500"
        );
        assert_eq!(StorageError::new(StorageErrorKind::Other, "boom").raw_code(), "Other");
    }

    #[test]
    fn test_config_error_display() {
        let error = BpError::Config(ConfigError::MissingMutationList("example.com".to_string()));
        assert!(error.to_string().contains("example.com"));
        assert!(error.to_string().starts_with("Configuration error"));
    }
}
