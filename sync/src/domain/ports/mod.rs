//! Domain ports (traits)
//!
//! Port traits define interfaces the jobs require.
//! Adapters provide concrete implementations of these traits.

pub mod github;
pub mod repositories;

pub use github::{GitHubClient, GitHubContributor, GitHubIssue, GitHubUser, RateLimitInfo};
pub use repositories::{ContributorRepository, ItemRepository, PageCursor, RepositoryRepository};
