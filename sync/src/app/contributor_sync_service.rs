//! Contributor Sync Service
//!
//! Fetches a repository's contributor list from GitHub and upserts it in one
//! write, keyed by `(github_id, repository)`. Any failure aborts the sync.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::entities::RepoContributor;
use crate::domain::ports::{ContributorRepository, GitHubClient, GitHubContributor};
use crate::error::SyncError;

/// Outcome of one sync run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContributorSyncReport {
    /// `owner/name`
    pub repository: String,
    pub fetched: usize,
    pub upserted: u64,
}

/// Map a GitHub contributor to the row the sync writes
pub fn to_repo_contributor(
    contributor: &GitHubContributor,
    repository: &str,
    now: DateTime<Utc>,
) -> RepoContributor {
    RepoContributor {
        github_id: contributor.id,
        username: contributor.login.clone(),
        avatar_url: contributor.avatar_url.clone(),
        profile_url: contributor.html_url.clone(),
        contributions: contributor.contributions,
        repository: repository.to_string(),
        user_type: contributor.user_type.clone(),
        is_bot: contributor.is_bot(),
        last_updated_at: now,
    }
}

/// Service for syncing a repository's contributors
pub struct ContributorSyncService<CR, GC>
where
    CR: ContributorRepository,
    GC: GitHubClient,
{
    contributors: Arc<CR>,
    github: Arc<GC>,
}

impl<CR, GC> ContributorSyncService<CR, GC>
where
    CR: ContributorRepository,
    GC: GitHubClient,
{
    pub fn new(contributors: Arc<CR>, github: Arc<GC>) -> Self {
        Self {
            contributors,
            github,
        }
    }

    /// Sync the contributors of `owner/name`
    pub async fn sync(&self, owner: &str, name: &str) -> Result<ContributorSyncReport, SyncError> {
        let repository = format!("{}/{}", owner, name);
        tracing::info!(%repository, "Fetching contributors");

        let remote = self.github.list_contributors(owner, name).await?;
        tracing::info!(%repository, count = remote.len(), "Fetched contributors");

        let now = Utc::now();
        let rows: Vec<RepoContributor> = remote
            .iter()
            .map(|c| to_repo_contributor(c, &repository, now))
            .collect();

        if rows.is_empty() {
            tracing::info!(%repository, "No contributors to sync");
            return Ok(ContributorSyncReport {
                repository,
                fetched: 0,
                upserted: 0,
            });
        }

        let upserted = self.contributors.upsert_repo_contributors(&rows).await?;
        tracing::info!(%repository, fetched = rows.len(), upserted, "Contributors synced");

        Ok(ContributorSyncReport {
            repository,
            fetched: rows.len(),
            upserted,
        })
    }
}
