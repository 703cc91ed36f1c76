//! Test utilities
//!
//! Manual mock implementations and test fixtures for unit testing.
//!
//! Why manual mocks instead of mockall?
//! - mockall has lifetime issues with traits containing `&str` parameters
//! - The in-memory stores apply the same filters and ordering as the SQL
//!   adapters, so pagination behavior is observable in unit tests
//! - Scripted GitHub responses are easier to read than expectation chains

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
