//! Mock implementations of port traits
//!
//! In-memory stores and a scripted GitHub client. Each records the calls
//! tests need to assert on.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::domain::entities::{
    ContributableItem, Contributor, ContributorId, ItemId, ItemKind, NewContributor,
    RepoContributor, Repository, RepositoryId,
};
use crate::domain::ports::{
    ContributorRepository, GitHubClient, GitHubContributor, GitHubIssue, GitHubUser,
    ItemRepository, PageCursor, RateLimitInfo, RepositoryRepository,
};
use crate::error::{DomainError, GitHubError};

// ============================================================================
// In-Memory Contributor Repository
// ============================================================================

#[derive(Default)]
pub struct InMemoryContributorRepository {
    contributors: Arc<RwLock<HashMap<ContributorId, Contributor>>>,
    created: Arc<RwLock<Vec<NewContributor>>>,
    repo_contributors: Arc<RwLock<HashMap<(i64, String), RepoContributor>>>,
    upsert_calls: Arc<RwLock<Vec<Vec<RepoContributor>>>>,
    fail_upserts: bool,
}

impl InMemoryContributorRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with a contributor
    pub fn with_contributor(self, contributor: Contributor) -> Self {
        self.contributors
            .write()
            .unwrap()
            .insert(contributor.id, contributor);
        self
    }

    /// Make every upsert fail with a database error
    pub fn failing_upserts(mut self) -> Self {
        self.fail_upserts = true;
        self
    }

    /// Batches passed to `upsert_repo_contributors`, in call order
    pub fn upsert_calls(&self) -> Vec<Vec<RepoContributor>> {
        self.upsert_calls.read().unwrap().clone()
    }

    pub fn repo_contributor_count(&self) -> usize {
        self.repo_contributors.read().unwrap().len()
    }

    pub fn repo_contributor(&self, github_id: i64, repository: &str) -> Option<RepoContributor> {
        self.repo_contributors
            .read()
            .unwrap()
            .get(&(github_id, repository.to_string()))
            .cloned()
    }

    /// Contributors inserted through `create`
    pub fn created(&self) -> Vec<NewContributor> {
        self.created.read().unwrap().clone()
    }

    pub fn id_for_github_id(&self, github_id: i64) -> Option<ContributorId> {
        self.contributors
            .read()
            .unwrap()
            .values()
            .find(|c| c.github_id == github_id)
            .map(|c| c.id)
    }
}

#[async_trait]
impl ContributorRepository for InMemoryContributorRepository {
    async fn upsert_repo_contributors(
        &self,
        rows: &[RepoContributor],
    ) -> Result<u64, DomainError> {
        if self.fail_upserts {
            return Err(DomainError::Database("connection reset".to_string()));
        }

        self.upsert_calls.write().unwrap().push(rows.to_vec());
        let mut stored = self.repo_contributors.write().unwrap();
        for row in rows {
            stored.insert((row.github_id, row.repository.clone()), row.clone());
        }
        Ok(rows.len() as u64)
    }

    async fn find_by_github_id(&self, github_id: i64) -> Result<Option<Contributor>, DomainError> {
        let contributors = self.contributors.read().unwrap();
        Ok(contributors
            .values()
            .find(|c| c.github_id == github_id)
            .cloned())
    }

    async fn create(&self, contributor: &NewContributor) -> Result<ContributorId, DomainError> {
        let id = ContributorId::new();
        self.contributors.write().unwrap().insert(
            id,
            Contributor {
                id,
                github_id: contributor.github_id,
                username: contributor.username.clone(),
                display_name: contributor.display_name.clone(),
                avatar_url: contributor.avatar_url.clone(),
                profile_url: contributor.profile_url.clone(),
                is_bot: contributor.is_bot,
                first_seen_at: Some(contributor.first_seen_at),
                last_updated_at: Some(contributor.last_updated_at),
            },
        );
        self.created.write().unwrap().push(contributor.clone());
        Ok(id)
    }
}

// ============================================================================
// In-Memory Repository Repository
// ============================================================================

#[derive(Default)]
pub struct InMemoryRepositoryRepository {
    repositories: Arc<RwLock<HashMap<RepositoryId, Repository>>>,
}

impl InMemoryRepositoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_repository(self, repository: Repository) -> Self {
        self.repositories
            .write()
            .unwrap()
            .insert(repository.id, repository);
        self
    }
}

#[async_trait]
impl RepositoryRepository for InMemoryRepositoryRepository {
    async fn find_by_id(&self, id: &RepositoryId) -> Result<Option<Repository>, DomainError> {
        Ok(self.repositories.read().unwrap().get(id).cloned())
    }
}

// ============================================================================
// In-Memory Item Repository
// ============================================================================

#[derive(Default)]
pub struct InMemoryItemRepository {
    items: Arc<RwLock<HashMap<ItemKind, Vec<ContributableItem>>>>,
    page_requests: Arc<RwLock<HashMap<ItemKind, usize>>>,
    block_updates: bool,
}

impl InMemoryItemRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_item(self, kind: ItemKind, item: ContributableItem) -> Self {
        self.items
            .write()
            .unwrap()
            .entry(kind)
            .or_default()
            .push(item);
        self
    }

    /// Make `set_author` match no rows, as if another writer got there first
    pub fn blocking_updates(mut self) -> Self {
        self.block_updates = true;
        self
    }

    pub fn page_requests(&self, kind: ItemKind) -> usize {
        self.page_requests
            .read()
            .unwrap()
            .get(&kind)
            .copied()
            .unwrap_or(0)
    }

    pub fn author_of(&self, kind: ItemKind, id: &ItemId) -> Option<ContributorId> {
        self.items
            .read()
            .unwrap()
            .get(&kind)
            .and_then(|items| items.iter().find(|i| i.id == *id))
            .and_then(|i| i.author_id)
    }

    /// Numbers of rows still missing an author, ascending
    pub fn missing_numbers(&self, kind: ItemKind) -> Vec<i64> {
        let mut numbers: Vec<i64> = self
            .missing_sorted(kind)
            .into_iter()
            .map(|i| i.number)
            .collect();
        numbers.sort_unstable();
        numbers
    }

    fn missing_sorted(&self, kind: ItemKind) -> Vec<ContributableItem> {
        let items = self.items.read().unwrap();
        let mut missing: Vec<ContributableItem> = items
            .get(&kind)
            .map(|items| {
                items
                    .iter()
                    .filter(|i| i.is_missing_author())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        missing.sort_by_key(|i| (i.created_at, i.id));
        missing
    }
}

#[async_trait]
impl ItemRepository for InMemoryItemRepository {
    async fn count_missing_author(&self, kind: ItemKind) -> Result<u64, DomainError> {
        Ok(self.missing_sorted(kind).len() as u64)
    }

    async fn find_missing_author(
        &self,
        kind: ItemKind,
        cursor: PageCursor,
        limit: u64,
    ) -> Result<Vec<ContributableItem>, DomainError> {
        *self.page_requests.write().unwrap().entry(kind).or_insert(0) += 1;

        let missing = self.missing_sorted(kind).into_iter();
        let page = match cursor {
            PageCursor::Offset(offset) => missing
                .skip(offset as usize)
                .take(limit as usize)
                .collect(),
            PageCursor::Keyset { after } => missing
                .filter(|i| after.map_or(true, |key| (i.created_at, i.id) > key))
                .take(limit as usize)
                .collect(),
        };
        Ok(page)
    }

    async fn set_author(
        &self,
        kind: ItemKind,
        id: &ItemId,
        author: &ContributorId,
    ) -> Result<u64, DomainError> {
        if self.block_updates {
            return Ok(0);
        }

        let mut items = self.items.write().unwrap();
        let Some(item) = items
            .get_mut(&kind)
            .and_then(|items| items.iter_mut().find(|i| i.id == *id))
        else {
            return Ok(0);
        };
        item.author_id = Some(*author);
        Ok(1)
    }
}

// ============================================================================
// Mock GitHub Client
// ============================================================================

/// Scripted reply to an issue lookup
#[derive(Debug, Clone)]
pub enum IssueResponse {
    /// Issue exists, with or without a `user`
    Found(Option<GitHubUser>),
    NotFound,
    RateLimited(Option<DateTime<Utc>>),
    ServerError(u16),
}

type IssueKey = (String, String, i64);

/// GitHub client with canned responses. Issues without a script return 404.
#[derive(Default)]
pub struct MockGitHubClient {
    contributors: Arc<RwLock<HashMap<(String, String), Vec<GitHubContributor>>>>,
    issues: Arc<RwLock<HashMap<IssueKey, Vec<IssueResponse>>>>,
    issue_calls: Arc<RwLock<HashMap<IssueKey, usize>>>,
    rate_limit_calls: Arc<RwLock<usize>>,
    fail_rate_limit: bool,
}

impl MockGitHubClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contributors(
        self,
        owner: &str,
        repo: &str,
        contributors: Vec<GitHubContributor>,
    ) -> Self {
        self.contributors
            .write()
            .unwrap()
            .insert((owner.to_string(), repo.to_string()), contributors);
        self
    }

    /// Answer every lookup of `owner/repo#number` with `response`
    pub fn with_issue(self, owner: &str, repo: &str, number: i64, response: IssueResponse) -> Self {
        self.with_issue_sequence(owner, repo, number, vec![response])
    }

    /// Answer successive lookups in order; the last response repeats
    pub fn with_issue_sequence(
        self,
        owner: &str,
        repo: &str,
        number: i64,
        responses: Vec<IssueResponse>,
    ) -> Self {
        self.issues
            .write()
            .unwrap()
            .insert((owner.to_string(), repo.to_string(), number), responses);
        self
    }

    /// Make `get_rate_limit` fail with a server error
    pub fn failing_rate_limit(mut self) -> Self {
        self.fail_rate_limit = true;
        self
    }

    pub fn issue_calls(&self, owner: &str, repo: &str, number: i64) -> usize {
        self.issue_calls
            .read()
            .unwrap()
            .get(&(owner.to_string(), repo.to_string(), number))
            .copied()
            .unwrap_or(0)
    }

    pub fn total_issue_calls(&self) -> usize {
        self.issue_calls.read().unwrap().values().sum()
    }

    pub fn rate_limit_calls(&self) -> usize {
        *self.rate_limit_calls.read().unwrap()
    }
}

#[async_trait]
impl GitHubClient for MockGitHubClient {
    async fn list_contributors(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Vec<GitHubContributor>, GitHubError> {
        self.contributors
            .read()
            .unwrap()
            .get(&(owner.to_string(), repo.to_string()))
            .cloned()
            .ok_or_else(|| GitHubError::NotFound(format!("{}/{}", owner, repo)))
    }

    async fn get_issue(
        &self,
        owner: &str,
        repo: &str,
        number: i64,
    ) -> Result<GitHubIssue, GitHubError> {
        let key = (owner.to_string(), repo.to_string(), number);
        let call = {
            let mut calls = self.issue_calls.write().unwrap();
            let count = calls.entry(key.clone()).or_insert(0);
            *count += 1;
            *count
        };

        let response = self
            .issues
            .read()
            .unwrap()
            .get(&key)
            .and_then(|script| script.get(call - 1).or_else(|| script.last()).cloned())
            .unwrap_or(IssueResponse::NotFound);

        match response {
            IssueResponse::Found(user) => Ok(GitHubIssue { number, user }),
            IssueResponse::NotFound => Err(GitHubError::NotFound(format!(
                "{}/{}#{}",
                owner, repo, number
            ))),
            IssueResponse::RateLimited(reset_at) => Err(GitHubError::RateLimited { reset_at }),
            IssueResponse::ServerError(status) => Err(GitHubError::Api {
                status,
                message: "upstream error".to_string(),
            }),
        }
    }

    async fn get_rate_limit(&self) -> Result<RateLimitInfo, GitHubError> {
        *self.rate_limit_calls.write().unwrap() += 1;
        if self.fail_rate_limit {
            return Err(GitHubError::Api {
                status: 503,
                message: "rate limit endpoint unavailable".to_string(),
            });
        }
        Ok(RateLimitInfo {
            limit: 5000,
            remaining: 4000,
            reset_at: Utc::now() + Duration::minutes(30),
        })
    }
}
