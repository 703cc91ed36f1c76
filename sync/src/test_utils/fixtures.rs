//! Test fixtures
//!
//! Factory functions for creating test data with sensible defaults.

use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

use crate::domain::entities::{
    ContributableItem, Contributor, ContributorId, ItemId, Repository, RepositoryId,
};
use crate::domain::ports::{GitHubContributor, GitHubUser};

fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

/// Create a test repository
pub fn test_repository(owner: &str, name: &str) -> Repository {
    Repository {
        id: RepositoryId(Uuid::new_v4()),
        owner: owner.to_string(),
        name: name.to_string(),
        github_id: Some(1000),
    }
}

/// Create an item missing its author. `created_at` grows with `number`, so
/// fixtures page in number order.
pub fn test_item(repository_id: RepositoryId, number: i64) -> ContributableItem {
    ContributableItem {
        id: ItemId(Uuid::new_v4()),
        number,
        repository_id,
        author_id: None,
        created_at: epoch() + Duration::minutes(number),
    }
}

/// Create a GitHub user as embedded in issue payloads
pub fn test_github_user(id: i64, login: &str) -> GitHubUser {
    GitHubUser {
        id,
        login: login.to_string(),
        name: None,
        avatar_url: Some(format!("https://avatars.githubusercontent.com/u/{}", id)),
        html_url: Some(format!("https://github.com/{}", login)),
        user_type: Some("User".to_string()),
        company: None,
        location: None,
        bio: None,
        public_repos: None,
        followers: None,
        following: None,
    }
}

/// Create a stored contributor
pub fn test_contributor(github_id: i64, username: &str) -> Contributor {
    Contributor {
        id: ContributorId::new(),
        github_id,
        username: username.to_string(),
        display_name: None,
        avatar_url: None,
        profile_url: Some(format!("https://github.com/{}", username)),
        is_bot: false,
        first_seen_at: Some(epoch()),
        last_updated_at: Some(epoch()),
    }
}

/// Create an entry of a repository contributor listing
pub fn test_github_contributor(id: i64, login: &str, contributions: i32) -> GitHubContributor {
    GitHubContributor {
        id,
        login: login.to_string(),
        avatar_url: Some(format!("https://avatars.githubusercontent.com/u/{}", id)),
        html_url: Some(format!("https://github.com/{}", login)),
        contributions,
        user_type: Some("User".to_string()),
    }
}
