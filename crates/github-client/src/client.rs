use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use serde::de::DeserializeOwned;

use crate::types::{Deployment, DeploymentStatus, PullRequest, Repository};
use crate::{GithubError, Result};

const API_VERSION: &str = "2022-11-28";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// ─── DeploymentApi ────────────────────────────────────────────────────────

/// The three read-only calls needed to get from a pull request to the
/// status of its latest deployment.
#[async_trait]
pub trait DeploymentApi: Send + Sync {
    async fn get_pull_request(&self, repo: &Repository, number: u64) -> Result<PullRequest>;

    /// Deployments for `sha`, optionally filtered by environment, most
    /// recent first.
    async fn list_deployments(
        &self,
        repo: &Repository,
        sha: &str,
        environment: Option<&str>,
    ) -> Result<Vec<Deployment>>;

    /// Statuses of one deployment, most recent first.
    async fn list_deployment_statuses(
        &self,
        repo: &Repository,
        deployment_id: u64,
    ) -> Result<Vec<DeploymentStatus>>;
}

// ─── GithubClient ─────────────────────────────────────────────────────────

/// Authenticated GitHub REST client.
///
/// Construct once per run and share by reference; the inner
/// `reqwest::Client` pools connections.
pub struct GithubClient {
    http: reqwest::Client,
    api_url: String,
}

impl GithubClient {
    pub const DEFAULT_API_URL: &'static str = "https://api.github.com";

    /// Build a client for `api_url` (e.g. `https://api.github.com`, or a
    /// GitHub Enterprise `https://host/api/v3`) authenticated with `token`.
    pub fn new(api_url: &str, token: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static(API_VERSION),
        );
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("preview-gate/", env!("CARGO_PKG_VERSION"))),
        );
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| GithubError::InvalidToken)?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = format!("{}{}", self.api_url, path);
        tracing::debug!(%url, "GitHub API request");

        let response = self.http.get(&url).query(query).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(GithubError::Status {
                status: status.as_u16(),
                path: path.to_string(),
                message: api_message(&body),
            });
        }

        serde_json::from_str(&body).map_err(|source| GithubError::Parse {
            path: path.to_string(),
            source,
        })
    }
}

#[async_trait]
impl DeploymentApi for GithubClient {
    async fn get_pull_request(&self, repo: &Repository, number: u64) -> Result<PullRequest> {
        let path = format!("/repos/{}/{}/pulls/{number}", repo.owner, repo.name);
        self.get_json(&path, &[]).await
    }

    async fn list_deployments(
        &self,
        repo: &Repository,
        sha: &str,
        environment: Option<&str>,
    ) -> Result<Vec<Deployment>> {
        let path = format!("/repos/{}/{}/deployments", repo.owner, repo.name);
        let mut query = vec![("sha", sha)];
        if let Some(env) = environment {
            query.push(("environment", env));
        }
        self.get_json(&path, &query).await
    }

    async fn list_deployment_statuses(
        &self,
        repo: &Repository,
        deployment_id: u64,
    ) -> Result<Vec<DeploymentStatus>> {
        let path = format!(
            "/repos/{}/{}/deployments/{deployment_id}/statuses",
            repo.owner, repo.name
        );
        self.get_json(&path, &[]).await
    }
}

/// Pull `message` out of a GitHub error body, falling back to the raw body.
fn api_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_owned))
        .unwrap_or_else(|| body.trim().to_string())
}

// ─── Tests ────────────────────────────────────────────────────────────────
