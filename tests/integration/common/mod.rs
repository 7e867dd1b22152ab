//! Common utilities for integration tests.
//!
//! Shared LocalStack setup: an admin client for fixtures and the matching
//! adapter configuration for the code under test.

pub mod localstack;

pub use localstack::{LocalStackTestContext, unique_name};
