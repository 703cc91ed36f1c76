//! Error types for contrib-sync
//!
//! This module defines error types for each layer:
//! - `DomainError`: data store errors
//! - `GitHubError`: GitHub API client errors
//! - `ConfigError`: startup configuration errors
//! - `SyncError`: application layer errors (what the jobs report)

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::entities::{ItemId, ItemKind};

/// Domain layer errors - data store failures
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid query: {0}")]
    Query(String),
}

/// GitHub API client errors
#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    /// 403/429 from GitHub. `reset_at` comes from `x-ratelimit-reset` when present.
    #[error("Rate limited (resets at {reset_at:?})")]
    RateLimited { reset_at: Option<DateTime<Utc>> },

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl GitHubError {
    /// Errors worth a fixed-delay retry: transport failures and unexpected statuses.
    pub fn is_transient(&self) -> bool {
        matches!(self, GitHubError::Request(_) | GitHubError::Api { .. })
    }
}

/// Configuration errors, fatal at startup
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Application layer errors
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("GitHub error: {0}")]
    GitHub(#[from] GitHubError),

    /// The update matched nothing, usually a row-level policy blocking the write.
    #[error("No rows updated for {kind} {id}")]
    NoRowsUpdated { kind: ItemKind, id: ItemId },

    #[error("Still rate limited after {attempts} attempts for {repository}#{number}")]
    RateLimitExhausted {
        repository: String,
        number: i64,
        attempts: u32,
    },

    #[error("Gave up after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: GitHubError,
    },
}
