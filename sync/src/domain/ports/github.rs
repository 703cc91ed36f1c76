//! GitHub client port trait
//!
//! Read-only view of the GitHub REST API used by both jobs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::BOT_USER_TYPE;
use crate::error::GitHubError;

/// Entry from `GET /repos/{owner}/{repo}/contributors`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubContributor {
    pub id: i64,
    pub login: String,
    pub avatar_url: Option<String>,
    pub html_url: Option<String>,
    #[serde(default)]
    pub contributions: i32,
    #[serde(rename = "type")]
    pub user_type: Option<String>,
}

impl GitHubContributor {
    pub fn is_bot(&self) -> bool {
        self.user_type.as_deref() == Some(BOT_USER_TYPE)
    }
}

/// Public profile of a GitHub user
///
/// The `user` object embedded in issue payloads carries only the identity
/// fields; the profile metadata is filled when GitHub includes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubUser {
    pub id: i64,
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub html_url: Option<String>,
    #[serde(rename = "type")]
    pub user_type: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub public_repos: Option<i32>,
    #[serde(default)]
    pub followers: Option<i32>,
    #[serde(default)]
    pub following: Option<i32>,
}

impl GitHubUser {
    pub fn is_bot(&self) -> bool {
        self.user_type.as_deref() == Some(BOT_USER_TYPE)
    }
}

/// Issue or pull request detail from `GET /repos/{owner}/{repo}/issues/{number}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubIssue {
    pub number: i64,
    #[serde(default)]
    pub user: Option<GitHubUser>,
}

/// Core quota from `GET /rate_limit`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitInfo {
    pub limit: u64,
    pub remaining: u64,
    pub reset_at: DateTime<Utc>,
}

/// Port trait for GitHub API reads
#[async_trait]
pub trait GitHubClient: Send + Sync {
    /// List a repository's contributors (first page only)
    async fn list_contributors(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Vec<GitHubContributor>, GitHubError>;

    /// Get an issue or pull request by number
    ///
    /// Returns `GitHubError::NotFound` on 404 and `GitHubError::RateLimited`
    /// on 403/429.
    async fn get_issue(&self, owner: &str, repo: &str, number: i64)
        -> Result<GitHubIssue, GitHubError>;

    /// Get the current core rate limit
    async fn get_rate_limit(&self) -> Result<RateLimitInfo, GitHubError>;
}
