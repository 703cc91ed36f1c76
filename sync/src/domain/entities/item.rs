//! Contributable item domain entity
//!
//! Pull requests and issues share one shape; `ItemKind` picks the table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::contributor::ContributorId;
use super::repository::RepositoryId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub Uuid);

impl From<Uuid> for ItemId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which table an item lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    PullRequest,
    Issue,
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemKind::PullRequest => write!(f, "pull_request"),
            ItemKind::Issue => write!(f, "issue"),
        }
    }
}

/// A pull request or issue row
#[derive(Debug, Clone, Serialize)]
pub struct ContributableItem {
    pub id: ItemId,
    pub number: i64,
    pub repository_id: RepositoryId,
    pub author_id: Option<ContributorId>,
    pub created_at: DateTime<Utc>,
}

impl ContributableItem {
    pub fn is_missing_author(&self) -> bool {
        self.author_id.is_none()
    }
}
