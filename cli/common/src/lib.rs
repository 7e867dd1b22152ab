//! Shared utilities for bucketprobe CLI binaries.
//!
//! Logging setup, the log-level argument and number/duration formatting.

pub mod args;
pub mod format;
pub mod logging;

pub use args::LogLevel;
pub use format::{format_duration, format_number, format_rate};
pub use logging::init_logging;
