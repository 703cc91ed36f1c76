//! Repository port traits
//!
//! These traits define the interface for data persistence.
//! Implementations are provided by adapters (e.g., PostgreSQL).

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::{
    ContributableItem, Contributor, ContributorId, ItemId, ItemKind, NewContributor,
    RepoContributor, Repository, RepositoryId,
};
use crate::error::DomainError;

/// Position of the next page of missing-author items
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageCursor {
    /// Skip this many rows of the filtered, ordered set
    Offset(u64),
    /// Rows strictly after `(created_at, id)`; `None` starts at the beginning
    Keyset {
        after: Option<(DateTime<Utc>, ItemId)>,
    },
}

/// Repository for contributor rows
#[async_trait]
pub trait ContributorRepository: Send + Sync {
    /// Upsert sync rows in one write, conflict key `(github_id, repository)`.
    /// Returns the number of rows written.
    async fn upsert_repo_contributors(
        &self,
        rows: &[RepoContributor],
    ) -> Result<u64, DomainError>;

    /// Find a contributor by GitHub user id
    async fn find_by_github_id(&self, github_id: i64) -> Result<Option<Contributor>, DomainError>;

    /// Insert a new contributor and return its internal id
    async fn create(&self, contributor: &NewContributor) -> Result<ContributorId, DomainError>;
}

/// Repository for repository rows (read-only)
#[async_trait]
pub trait RepositoryRepository: Send + Sync {
    /// Find a repository by internal id
    async fn find_by_id(&self, id: &RepositoryId) -> Result<Option<Repository>, DomainError>;
}

/// Repository for pull request and issue rows
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// Count rows with no author but with both a repository and a number
    async fn count_missing_author(&self, kind: ItemKind) -> Result<u64, DomainError>;

    /// Fetch a page of missing-author rows ordered by `created_at`, then `id`
    async fn find_missing_author(
        &self,
        kind: ItemKind,
        cursor: PageCursor,
        limit: u64,
    ) -> Result<Vec<ContributableItem>, DomainError>;

    /// Set the author of one row. Returns the number of rows affected.
    async fn set_author(
        &self,
        kind: ItemKind,
        id: &ItemId,
        author: &ContributorId,
    ) -> Result<u64, DomainError>;
}
