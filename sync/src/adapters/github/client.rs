//! GitHub API client implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, ACCEPT};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use urlencoding::encode;

use crate::domain::ports::{
    GitHubClient, GitHubContributor, GitHubIssue, RateLimitInfo,
};
use crate::error::GitHubError;

const USER_AGENT: &str = concat!("contrib-sync/", env!("CARGO_PKG_VERSION"));
const GITHUB_MEDIA_TYPE: &str = "application/vnd.github+json";
const GITHUB_API_VERSION: &str = "2022-11-28";

/// Implementation of the GitHub API client
pub struct GitHubClientImpl {
    http: Client,
    base_url: String,
    token: String,
}

impl GitHubClientImpl {
    pub fn new(base_url: String, token: String) -> Result<Self, GitHubError> {
        let http = Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.http
            .get(self.api_url(path))
            .bearer_auth(&self.token)
            .header(ACCEPT, GITHUB_MEDIA_TYPE)
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION)
    }

    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
        resource: impl FnOnce() -> String,
    ) -> Result<T, GitHubError> {
        let status = response.status();

        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| GitHubError::Deserialization(e.to_string()))
        } else if status == StatusCode::NOT_FOUND {
            Err(GitHubError::NotFound(resource()))
        } else if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
            Err(GitHubError::RateLimited {
                reset_at: parse_reset_header(response.headers()),
            })
        } else {
            let message = response.text().await.unwrap_or_default();
            Err(GitHubError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

/// Read `x-ratelimit-reset` (epoch seconds) from a GitHub response.
pub fn parse_reset_header(headers: &HeaderMap) -> Option<DateTime<Utc>> {
    headers
        .get("x-ratelimit-reset")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<i64>().ok())
        .and_then(|epoch| DateTime::from_timestamp(epoch, 0))
}

/// Response types from GitHub API
#[derive(Deserialize)]
struct RateLimitResponse {
    resources: RateLimitResources,
}

#[derive(Deserialize)]
struct RateLimitResources {
    core: RateLimitResource,
}

#[derive(Deserialize)]
struct RateLimitResource {
    limit: u64,
    remaining: u64,
    reset: i64,
}

impl From<RateLimitResource> for RateLimitInfo {
    fn from(r: RateLimitResource) -> Self {
        RateLimitInfo {
            limit: r.limit,
            remaining: r.remaining,
            reset_at: DateTime::from_timestamp(r.reset, 0).unwrap_or_else(Utc::now),
        }
    }
}

#[async_trait]
impl GitHubClient for GitHubClientImpl {
    async fn list_contributors(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Vec<GitHubContributor>, GitHubError> {
        let resp = self
            .get(&format!(
                "/repos/{}/{}/contributors",
                encode(owner),
                encode(repo)
            ))
            .query(&[("per_page", "100")])
            .send()
            .await?;

        // An empty repository answers 204 with no body
        if resp.status() == StatusCode::NO_CONTENT {
            return Ok(Vec::new());
        }

        self.handle_response(resp, || format!("{}/{}", owner, repo))
            .await
    }

    async fn get_issue(
        &self,
        owner: &str,
        repo: &str,
        number: i64,
    ) -> Result<GitHubIssue, GitHubError> {
        let resp = self
            .get(&format!(
                "/repos/{}/{}/issues/{}",
                encode(owner),
                encode(repo),
                number
            ))
            .send()
            .await?;

        self.handle_response(resp, || format!("{}/{}#{}", owner, repo, number))
            .await
    }

    async fn get_rate_limit(&self) -> Result<RateLimitInfo, GitHubError> {
        let resp = self.get("/rate_limit").send().await?;

        let limits: RateLimitResponse = self
            .handle_response(resp, || "rate_limit".to_string())
            .await?;
        Ok(limits.resources.core.into())
    }
}
