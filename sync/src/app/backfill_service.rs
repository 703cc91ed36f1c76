//! Author-ID Backfill Service
//!
//! Repairs pull request and issue rows that have no author reference:
//! - count the rows missing an author
//! - page through them oldest first
//! - per row: fetch the author from GitHub, resolve or create the
//!   contributor, patch the row
//!
//! Everything runs sequentially with fixed delays between rows and pages.
//! A failing row is logged and counted; only count and page queries abort a
//! table.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tokio::time::sleep;

use super::retry::RetryPolicy;
use crate::domain::entities::{
    ContributableItem, ContributorId, ItemId, ItemKind, NewContributor, Repository, RepositoryId,
};
use crate::domain::ports::{
    ContributorRepository, GitHubClient, GitHubUser, ItemRepository, PageCursor,
    RepositoryRepository,
};
use crate::error::{DomainError, GitHubError, SyncError};

/// How the next page of missing-author rows is located
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaginationMode {
    /// Numeric offset into the shrinking filtered set. Rows fixed on one page
    /// shift later rows forward, so some rows are only reached on a later run.
    #[default]
    Offset,
    /// Continue after the last `(created_at, id)` seen
    Keyset,
}

impl std::str::FromStr for PaginationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "offset" => Ok(PaginationMode::Offset),
            "keyset" => Ok(PaginationMode::Keyset),
            _ => Err(format!("Unknown pagination mode: {}", s)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BackfillSettings {
    pub batch_size: u64,
    /// Pause after each row
    pub request_delay: Duration,
    /// Pause between pages
    pub batch_delay: Duration,
    pub pagination: PaginationMode,
    /// Log the GitHub quota every this many pages (0 disables)
    pub rate_limit_check_every: u64,
    pub retry: RetryPolicy,
}

impl Default for BackfillSettings {
    fn default() -> Self {
        Self {
            batch_size: 50,
            request_delay: Duration::from_millis(1000),
            batch_delay: Duration::from_millis(5000),
            pagination: PaginationMode::Offset,
            rate_limit_check_every: 5,
            retry: RetryPolicy::default(),
        }
    }
}

/// Counters for one table run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BackfillStats {
    pub total_missing: u64,
    pub pages: u64,
    pub processed: u64,
    pub updated: u64,
    pub skipped: u64,
    pub created_contributors: u64,
    pub errors: u64,
}

impl BackfillStats {
    fn add(&mut self, other: &BackfillStats) {
        self.total_missing += other.total_missing;
        self.pages += other.pages;
        self.processed += other.processed;
        self.updated += other.updated;
        self.skipped += other.skipped;
        self.created_contributors += other.created_contributors;
        self.errors += other.errors;
    }
}

/// Result of a full backfill run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BackfillReport {
    pub pull_requests: BackfillStats,
    pub issues: BackfillStats,
}

impl BackfillReport {
    pub fn total(&self) -> BackfillStats {
        let mut total = BackfillStats::default();
        total.add(&self.pull_requests);
        total.add(&self.issues);
        total
    }
}

/// Whether resolve-or-create found or inserted the contributor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContributorResolution {
    Existing(ContributorId),
    Created(ContributorId),
}

impl ContributorResolution {
    pub fn id(&self) -> ContributorId {
        match self {
            ContributorResolution::Existing(id) | ContributorResolution::Created(id) => *id,
        }
    }
}

enum ItemOutcome {
    Updated,
    Skipped,
}

/// Build the contributor row for an author seen for the first time
pub fn new_contributor_from_profile(author: &GitHubUser) -> NewContributor {
    let now = Utc::now();
    NewContributor {
        github_id: author.id,
        username: author.login.clone(),
        display_name: author.name.clone(),
        avatar_url: author.avatar_url.clone(),
        profile_url: author.html_url.clone(),
        user_type: author.user_type.clone(),
        is_bot: author.is_bot(),
        company: author.company.clone(),
        location: author.location.clone(),
        bio: author.bio.clone(),
        public_repos: author.public_repos,
        followers: author.followers,
        following: author.following,
        first_seen_at: now,
        last_updated_at: now,
    }
}

/// Service for backfilling author references
pub struct AuthorBackfillService<IR, RR, CR, GC>
where
    IR: ItemRepository,
    RR: RepositoryRepository,
    CR: ContributorRepository,
    GC: GitHubClient,
{
    items: Arc<IR>,
    repositories: Arc<RR>,
    contributors: Arc<CR>,
    github: Arc<GC>,
    settings: BackfillSettings,
}

impl<IR, RR, CR, GC> AuthorBackfillService<IR, RR, CR, GC>
where
    IR: ItemRepository,
    RR: RepositoryRepository,
    CR: ContributorRepository,
    GC: GitHubClient,
{
    pub fn new(
        items: Arc<IR>,
        repositories: Arc<RR>,
        contributors: Arc<CR>,
        github: Arc<GC>,
        settings: BackfillSettings,
    ) -> Self {
        Self {
            items,
            repositories,
            contributors,
            github,
            settings,
        }
    }

    /// Backfill pull requests, then issues
    pub async fn run(&self) -> Result<BackfillReport, SyncError> {
        let pull_requests = self.backfill_table(ItemKind::PullRequest).await?;
        let issues = self.backfill_table(ItemKind::Issue).await?;

        let report = BackfillReport {
            pull_requests,
            issues,
        };
        let total = report.total();
        tracing::info!(
            processed = total.processed,
            updated = total.updated,
            skipped = total.skipped,
            created = total.created_contributors,
            errors = total.errors,
            "Backfill complete"
        );

        Ok(report)
    }

    /// Backfill one table
    pub async fn backfill_table(&self, kind: ItemKind) -> Result<BackfillStats, SyncError> {
        let batch_size = self.settings.batch_size.max(1);
        let total = self.items.count_missing_author(kind).await?;
        let mut stats = BackfillStats {
            total_missing: total,
            ..BackfillStats::default()
        };

        tracing::info!(%kind, total, "Rows missing an author");
        if total == 0 {
            return Ok(stats);
        }

        let mut repos: HashMap<RepositoryId, Repository> = HashMap::new();
        let mut cursor = match self.settings.pagination {
            PaginationMode::Offset => PageCursor::Offset(0),
            PaginationMode::Keyset => PageCursor::Keyset { after: None },
        };

        loop {
            let page = self
                .items
                .find_missing_author(kind, cursor, batch_size)
                .await?;
            if page.is_empty() {
                break;
            }
            stats.pages += 1;
            tracing::info!(%kind, page = stats.pages, rows = page.len(), "Processing batch");

            for item in &page {
                self.process_item(kind, item, &mut repos, &mut stats).await;
                sleep(self.settings.request_delay).await;
            }

            tracing::info!(
                %kind,
                page = stats.pages,
                processed = stats.processed,
                updated = stats.updated,
                skipped = stats.skipped,
                created = stats.created_contributors,
                errors = stats.errors,
                "Batch complete"
            );

            let every = self.settings.rate_limit_check_every;
            if every > 0 && stats.pages % every == 0 {
                self.log_rate_limit().await;
            }

            cursor = match cursor {
                PageCursor::Offset(offset) => {
                    let next = offset + batch_size;
                    if next >= total {
                        break;
                    }
                    PageCursor::Offset(next)
                }
                PageCursor::Keyset { .. } => match page.last() {
                    Some(last) if page.len() as u64 >= batch_size => PageCursor::Keyset {
                        after: Some((last.created_at, last.id)),
                    },
                    _ => break,
                },
            };

            sleep(self.settings.batch_delay).await;
        }

        tracing::info!(
            %kind,
            processed = stats.processed,
            updated = stats.updated,
            skipped = stats.skipped,
            created = stats.created_contributors,
            errors = stats.errors,
            "Table backfill complete"
        );

        Ok(stats)
    }

    async fn process_item(
        &self,
        kind: ItemKind,
        item: &ContributableItem,
        repos: &mut HashMap<RepositoryId, Repository>,
        stats: &mut BackfillStats,
    ) {
        stats.processed += 1;

        match self.backfill_item(kind, item, repos, stats).await {
            Ok(ItemOutcome::Updated) => stats.updated += 1,
            Ok(ItemOutcome::Skipped) => {
                stats.skipped += 1;
                tracing::debug!(%kind, id = %item.id, number = item.number, "No author found, skipping");
            }
            Err(e) => {
                stats.errors += 1;
                tracing::warn!(
                    %kind,
                    id = %item.id,
                    number = item.number,
                    error = %e,
                    "Failed to backfill author"
                );
            }
        }
    }

    async fn backfill_item(
        &self,
        kind: ItemKind,
        item: &ContributableItem,
        repos: &mut HashMap<RepositoryId, Repository>,
        stats: &mut BackfillStats,
    ) -> Result<ItemOutcome, SyncError> {
        let repository = self.repository(&item.repository_id, repos).await?;

        let Some(author) = self.resolve_author(&repository, item.number).await? else {
            return Ok(ItemOutcome::Skipped);
        };

        let resolution = self.resolve_or_create_contributor(&author).await?;
        if let ContributorResolution::Created(_) = resolution {
            stats.created_contributors += 1;
        }

        self.patch_author(kind, &item.id, &resolution.id()).await?;
        tracing::debug!(%kind, id = %item.id, author = %author.login, "Author backfilled");

        Ok(ItemOutcome::Updated)
    }

    /// Repository lookup, cached for the table run
    async fn repository(
        &self,
        id: &RepositoryId,
        repos: &mut HashMap<RepositoryId, Repository>,
    ) -> Result<Repository, SyncError> {
        if let Some(repo) = repos.get(id) {
            return Ok(repo.clone());
        }

        let repo = self
            .repositories
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Repository {} not found", id)))?;
        repos.insert(*id, repo.clone());

        Ok(repo)
    }

    /// Fetch the author of `repository#number` from GitHub.
    ///
    /// `Ok(None)` when the item is gone (404) or has no author.
    pub async fn resolve_author(
        &self,
        repository: &Repository,
        number: i64,
    ) -> Result<Option<GitHubUser>, SyncError> {
        let policy = &self.settings.retry;
        let mut rate_limited = 0u32;
        let mut failures = 0u32;

        loop {
            match self
                .github
                .get_issue(&repository.owner, &repository.name, number)
                .await
            {
                Ok(issue) => return Ok(issue.user),
                Err(GitHubError::NotFound(_)) => return Ok(None),
                Err(GitHubError::RateLimited { reset_at }) => {
                    rate_limited += 1;
                    if rate_limited >= policy.max_rate_limit_attempts {
                        return Err(SyncError::RateLimitExhausted {
                            repository: repository.full_name(),
                            number,
                            attempts: rate_limited,
                        });
                    }

                    let wait = policy.rate_limit_wait(reset_at, Utc::now());
                    tracing::warn!(
                        repository = %repository.full_name(),
                        number,
                        attempt = rate_limited,
                        wait_secs = wait.as_secs(),
                        "Rate limited, waiting for reset"
                    );
                    sleep(wait).await;
                }
                Err(e) if e.is_transient() => {
                    failures += 1;
                    if failures > policy.max_transient_retries {
                        return Err(SyncError::RetriesExhausted {
                            attempts: failures,
                            source: e,
                        });
                    }

                    tracing::debug!(
                        repository = %repository.full_name(),
                        number,
                        attempt = failures,
                        error = %e,
                        "Request failed, retrying"
                    );
                    sleep(policy.transient_delay).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Find the contributor for `author` by GitHub id, inserting one if absent.
    /// Existing rows are returned as they are.
    pub async fn resolve_or_create_contributor(
        &self,
        author: &GitHubUser,
    ) -> Result<ContributorResolution, SyncError> {
        if let Some(existing) = self.contributors.find_by_github_id(author.id).await? {
            return Ok(ContributorResolution::Existing(existing.id));
        }

        let id = self
            .contributors
            .create(&new_contributor_from_profile(author))
            .await?;
        tracing::info!(github_id = author.id, login = %author.login, "Created contributor");

        Ok(ContributorResolution::Created(id))
    }

    /// Point the row at `author`. Zero affected rows is an error.
    pub async fn patch_author(
        &self,
        kind: ItemKind,
        id: &ItemId,
        author: &ContributorId,
    ) -> Result<(), SyncError> {
        let affected = self.items.set_author(kind, id, author).await?;
        if affected == 0 {
            return Err(SyncError::NoRowsUpdated { kind, id: *id });
        }
        Ok(())
    }

    async fn log_rate_limit(&self) {
        match self.github.get_rate_limit().await {
            Ok(info) => tracing::info!(
                remaining = info.remaining,
                limit = info.limit,
                reset_at = %info.reset_at,
                "GitHub rate limit"
            ),
            Err(e) => tracing::warn!(error = %e, "Could not read GitHub rate limit"),
        }
    }
}
