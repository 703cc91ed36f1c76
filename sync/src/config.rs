use std::env;
use std::time::Duration;

use crate::app::{BackfillSettings, PaginationMode};
use crate::error::ConfigError;

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_BATCH_SIZE: u64 = 50;
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 1000;
pub const DEFAULT_BATCH_DELAY_MS: u64 = 5000;

/// Repository whose contributors are synced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetRepo {
    pub owner: String,
    pub name: String,
}

impl std::fmt::Display for TargetRepo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub github_token: String,
    pub github_api_url: String,
    pub database_url: String,
    /// Falls back to `GITHUB_REPOSITORY` (set by GitHub Actions)
    pub target_repo: Option<TargetRepo>,
    pub batch_size: u64,
    pub request_delay: Duration,
    pub batch_delay: Duration,
    /// Write to the `*_replica` tables instead of production
    pub use_replica_tables: bool,
    pub pagination: PaginationMode,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from any variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let github_token = get("GITHUB_TOKEN").ok_or(ConfigError::Missing("GITHUB_TOKEN"))?;
        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let github_api_url = get("GITHUB_API_URL")
            .unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let invoking = get("GITHUB_REPOSITORY").and_then(|full| {
            full.split_once('/')
                .map(|(owner, name)| (owner.trim(), name.trim()))
                .filter(|(owner, name)| !owner.is_empty() && !name.is_empty())
                .map(|(owner, name)| (owner.to_string(), name.to_string()))
        });
        let owner = get("TARGET_REPO_OWNER").or_else(|| invoking.as_ref().map(|(o, _)| o.clone()));
        let name = get("TARGET_REPO_NAME").or_else(|| invoking.as_ref().map(|(_, n)| n.clone()));
        let target_repo = match (owner, name) {
            (Some(owner), Some(name)) => Some(TargetRepo { owner, name }),
            _ => None,
        };

        let batch_size = parse_u64(&get, "BATCH_SIZE", DEFAULT_BATCH_SIZE)?;
        if batch_size == 0 {
            return Err(ConfigError::Invalid {
                name: "BATCH_SIZE",
                value: "0".to_string(),
            });
        }

        let request_delay = Duration::from_millis(parse_u64(
            &get,
            "DELAY_BETWEEN_REQUESTS_MS",
            DEFAULT_REQUEST_DELAY_MS,
        )?);
        let batch_delay = Duration::from_millis(parse_u64(
            &get,
            "DELAY_BETWEEN_BATCHES_MS",
            DEFAULT_BATCH_DELAY_MS,
        )?);

        let use_replica_tables = match get("USE_REPLICA_TABLES") {
            None => false,
            Some(v) => parse_bool(&v).ok_or(ConfigError::Invalid {
                name: "USE_REPLICA_TABLES",
                value: v,
            })?,
        };

        let pagination = match get("BACKFILL_PAGINATION") {
            None => PaginationMode::Offset,
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid {
                name: "BACKFILL_PAGINATION",
                value: v,
            })?,
        };

        Ok(Self {
            github_token,
            github_api_url,
            database_url,
            target_repo,
            batch_size,
            request_delay,
            batch_delay,
            use_replica_tables,
            pagination,
        })
    }

    /// The sync job cannot run without a target repository
    pub fn require_target_repo(&self) -> Result<&TargetRepo, ConfigError> {
        self.target_repo
            .as_ref()
            .ok_or(ConfigError::Missing("TARGET_REPO_OWNER/TARGET_REPO_NAME"))
    }

    pub fn backfill_settings(&self) -> BackfillSettings {
        BackfillSettings {
            batch_size: self.batch_size,
            request_delay: self.request_delay,
            batch_delay: self.batch_delay,
            pagination: self.pagination,
            ..BackfillSettings::default()
        }
    }
}

fn parse_u64<F>(get: &F, name: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match get(name) {
        None => Ok(default),
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: v }),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
