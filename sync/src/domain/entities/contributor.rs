//! Contributor domain entity
//!
//! A GitHub user known to the store. The external `github_id` is the natural
//! key and never changes once a row exists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// GitHub `type` value for bot accounts
pub const BOT_USER_TYPE: &str = "Bot";

/// Internal identifier for a contributor row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContributorId(pub Uuid);

impl ContributorId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ContributorId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for ContributorId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ContributorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A contributor row
#[derive(Debug, Clone, Serialize)]
pub struct Contributor {
    pub id: ContributorId,
    pub github_id: i64,
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub profile_url: Option<String>,
    pub is_bot: bool,
    pub first_seen_at: Option<DateTime<Utc>>,
    pub last_updated_at: Option<DateTime<Utc>>,
}

/// Data for inserting a contributor discovered by the backfill
#[derive(Debug, Clone, PartialEq)]
pub struct NewContributor {
    pub github_id: i64,
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub profile_url: Option<String>,
    pub user_type: Option<String>,
    pub is_bot: bool,
    pub company: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub public_repos: Option<i32>,
    pub followers: Option<i32>,
    pub following: Option<i32>,
    pub first_seen_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
}

/// Row written by the contributor sync, keyed by `(github_id, repository)`
#[derive(Debug, Clone, PartialEq)]
pub struct RepoContributor {
    pub github_id: i64,
    pub username: String,
    pub avatar_url: Option<String>,
    pub profile_url: Option<String>,
    pub contributions: i32,
    /// `owner/name` label of the synced repository
    pub repository: String,
    pub user_type: Option<String>,
    pub is_bot: bool,
    pub last_updated_at: DateTime<Utc>,
}

impl RepoContributor {
    /// Upsert conflict key
    pub fn conflict_key(&self) -> (i64, &str) {
        (self.github_id, &self.repository)
    }
}
