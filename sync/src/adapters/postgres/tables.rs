//! Table name mapping
//!
//! Production and replica tables have identical shapes; the replica flag only
//! changes which names the adapters write to.

use crate::domain::entities::ItemKind;

const REPLICA_SUFFIX: &str = "_replica";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNames {
    pub contributors: String,
    pub pull_requests: String,
    pub issues: String,
    pub repositories: String,
}

impl TableNames {
    pub fn production() -> Self {
        Self::with_suffix("")
    }

    pub fn replica() -> Self {
        Self::with_suffix(REPLICA_SUFFIX)
    }

    pub fn select(use_replica: bool) -> Self {
        if use_replica {
            Self::replica()
        } else {
            Self::production()
        }
    }

    pub fn with_suffix(suffix: &str) -> Self {
        Self {
            contributors: format!("contributors{}", suffix),
            pull_requests: format!("pull_requests{}", suffix),
            issues: format!("issues{}", suffix),
            repositories: format!("repositories{}", suffix),
        }
    }

    /// Table holding items of `kind`
    pub fn items(&self, kind: ItemKind) -> &str {
        match kind {
            ItemKind::PullRequest => &self.pull_requests,
            ItemKind::Issue => &self.issues,
        }
    }
}
