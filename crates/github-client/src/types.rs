use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::GithubError;

// ─── Repository ───────────────────────────────────────────────────────────

/// An `owner/repo` pair, as found in `GITHUB_REPOSITORY`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub owner: String,
    pub name: String,
}

impl Repository {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl FromStr for Repository {
    type Err = GithubError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (owner, name) = raw
            .trim()
            .split_once('/')
            .ok_or_else(|| GithubError::InvalidRepository(raw.to_string()))?;
        let owner = owner.trim();
        let name = name.trim();
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return Err(GithubError::InvalidRepository(raw.to_string()));
        }
        Ok(Self::new(owner, name))
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

// ─── Pull requests ────────────────────────────────────────────────────────

/// `GET /repos/{owner}/{repo}/pulls/{number}`, only the fields we read.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PullRequest {
    pub number: u64,
    pub head: PullRequestHead,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PullRequestHead {
    pub sha: String,
    #[serde(default, rename = "ref")]
    pub branch: Option<String>,
}

// ─── Deployments ──────────────────────────────────────────────────────────

/// One entry of `GET /repos/{owner}/{repo}/deployments`.
/// GitHub returns these most recent first.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Deployment {
    pub id: u64,
    pub sha: String,
    #[serde(default)]
    pub environment: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// `state` of a deployment status.
///
/// Values GitHub may add in the future land in [`DeploymentState::Unknown`]
/// instead of failing deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentState {
    Queued,
    InProgress,
    Pending,
    Success,
    Failure,
    Error,
    Inactive,
    #[serde(other)]
    Unknown,
}

impl DeploymentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeploymentState::Queued => "queued",
            DeploymentState::InProgress => "in_progress",
            DeploymentState::Pending => "pending",
            DeploymentState::Success => "success",
            DeploymentState::Failure => "failure",
            DeploymentState::Error => "error",
            DeploymentState::Inactive => "inactive",
            DeploymentState::Unknown => "unknown",
        }
    }
}

impl fmt::Display for DeploymentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of `GET /repos/{owner}/{repo}/deployments/{id}/statuses`,
/// most recent first.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DeploymentStatus {
    #[serde(default)]
    pub id: u64,
    pub state: DeploymentState,
    #[serde(default)]
    pub description: Option<String>,
    /// Deprecated upstream but still what most preview providers fill in.
    #[serde(default)]
    pub target_url: Option<String>,
    #[serde(default)]
    pub environment_url: Option<String>,
    #[serde(default)]
    pub log_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl DeploymentStatus {
    /// The preview URL this status points at.
    ///
    /// GitHub sends `""` rather than `null` for unset URLs, so empty strings
    /// count as absent. `target_url` wins over `environment_url`.
    pub fn url(&self) -> Option<&str> {
        non_empty(self.target_url.as_deref()).or_else(|| non_empty(self.environment_url.as_deref()))
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}
