//! GitHub REST API client
//!
//! The [`ActivityApi`] trait is the seam between the fetch engine and the
//! outside world: the engine only ever asks for repository metadata and the
//! rate limiter's reset time. [`GitHubClient`] is the production
//! implementation over `api.github.com`; tests substitute scripted mocks.
//!
//! The client is shared read-only across all fetch workers (`reqwest::Client`
//! is internally reference-counted and safe for concurrent use). Rate
//! limiting is enforced by the service, not by this client; the fetch engine
//! reacts to it through the error taxonomy.

use crate::config::ApiConfig;
use crate::error::ApiError;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;

/// Header carrying the number of requests left in the current window
const RATELIMIT_REMAINING: &str = "x-ratelimit-remaining";

/// Header carrying the unix timestamp at which the window resets
const RATELIMIT_RESET: &str = "x-ratelimit-reset";

/// Repository metadata fragment the fetch engine consumes
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepoMetadata {
    /// Timestamp of the repository's most recent commit
    pub latest_commit: DateTime<Utc>,
}

/// External repository API, as seen by the fetch engine
///
/// Implementations must be safe to share across concurrent workers.
#[async_trait]
pub trait ActivityApi: Send + Sync {
    /// Fetch metadata for `repo` (an `owner/repo` identifier), including its
    /// most recent commit timestamp
    async fn repository_metadata(&self, repo: &str) -> Result<RepoMetadata, ApiError>;

    /// Query the instant at which the primary rate limit resets
    async fn rate_limit_reset(&self) -> Result<DateTime<Utc>, ApiError>;
}

/// Production [`ActivityApi`] implementation over the GitHub REST API
pub struct GitHubClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl GitHubClient {
    /// Create a client from the API configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(config: &ApiConfig) -> crate::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| crate::Error::Other(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    fn request(&self, path: &str) -> reqwest::RequestBuilder {
        let mut req = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .header("accept", "application/vnd.github+json");
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        req
    }

    /// Map a non-success response to the error taxonomy
    ///
    /// 404 is permanent. 403 and 429 are rate limiting when the remaining
    /// quota header reads zero, access denial otherwise. Anything else is
    /// unclassified.
    async fn classify(repo: &str, response: reqwest::Response) -> ApiError {
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return ApiError::NotFound {
                repo: repo.to_string(),
            };
        }

        if status == reqwest::StatusCode::FORBIDDEN
            || status == reqwest::StatusCode::TOO_MANY_REQUESTS
        {
            let remaining = header_value(&response, RATELIMIT_REMAINING);
            if remaining.as_deref() == Some("0") {
                let reset = header_value(&response, RATELIMIT_RESET)
                    .and_then(|v| v.parse::<i64>().ok())
                    .and_then(|secs| Utc.timestamp_opt(secs, 0).single());
                return ApiError::RateLimited { reset };
            }
            return ApiError::Forbidden {
                repo: repo.to_string(),
            };
        }

        let message = response.text().await.unwrap_or_default();
        ApiError::Status {
            status: status.as_u16(),
            message,
        }
    }
}

fn header_value(response: &reqwest::Response, name: &str) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

#[derive(Debug, Deserialize)]
struct RepoResponse {
    full_name: String,
}

#[derive(Debug, Deserialize)]
struct CommitItem {
    commit: CommitDetail,
}

#[derive(Debug, Deserialize)]
struct CommitDetail {
    author: Option<CommitSignature>,
    committer: Option<CommitSignature>,
}

#[derive(Debug, Deserialize)]
struct CommitSignature {
    date: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct RateLimitResponse {
    resources: RateLimitResources,
}

#[derive(Debug, Deserialize)]
struct RateLimitResources {
    core: RateLimitWindow,
}

#[derive(Debug, Deserialize)]
struct RateLimitWindow {
    reset: i64,
}

#[async_trait]
impl ActivityApi for GitHubClient {
    async fn repository_metadata(&self, repo: &str) -> Result<RepoMetadata, ApiError> {
        // Repository lookup first: distinguishes missing/denied repos before
        // touching the commit listing
        let response = self.request(&format!("/repos/{repo}")).send().await?;
        if !response.status().is_success() {
            return Err(Self::classify(repo, response).await);
        }
        let metadata: RepoResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(format!("repository body: {e}")))?;
        tracing::debug!(repo = %metadata.full_name, "Repository metadata fetched");

        // Most recent commit only
        let response = self
            .request(&format!("/repos/{repo}/commits"))
            .query(&[("per_page", "1")])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::classify(repo, response).await);
        }
        let commits: Vec<CommitItem> = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(format!("commit listing body: {e}")))?;

        let latest = commits
            .first()
            .and_then(|item| {
                item.commit
                    .author
                    .as_ref()
                    .or(item.commit.committer.as_ref())
            })
            .map(|signature| signature.date)
            .ok_or_else(|| ApiError::Decode(format!("no commits returned for {repo}")))?;

        Ok(RepoMetadata {
            latest_commit: latest,
        })
    }

    async fn rate_limit_reset(&self) -> Result<DateTime<Utc>, ApiError> {
        let response = self.request("/rate_limit").send().await?;
        if !response.status().is_success() {
            return Err(Self::classify("rate_limit", response).await);
        }
        let body: RateLimitResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(format!("rate limit body: {e}")))?;

        Utc.timestamp_opt(body.resources.core.reset, 0)
            .single()
            .ok_or_else(|| {
                ApiError::Decode(format!(
                    "rate limit reset out of range: {}",
                    body.resources.core.reset
                ))
            })
    }
}
