//! Adapters layer
//!
//! Implementations of port traits for external systems.

pub mod github;
pub mod postgres;

pub use github::GitHubClientImpl;
pub use postgres::{
    PostgresContributorRepository, PostgresItemRepository, PostgresRepositoryRepository,
    TableNames,
};
