//! GitHub adapter
//!
//! reqwest implementation of the GitHub API client.

pub mod client;

pub use client::GitHubClientImpl;
