//! `github-client`: the slice of the GitHub REST API that `preview-gate`
//! needs to follow a pull request to its preview deployment.
//!
//! # Architecture
//!
//! ```text
//! Repository + token
//!     │
//!     ▼
//! GithubClient        ← one reqwest::Client, built once, passed by reference
//!     │
//!     ▼
//! DeploymentApi trait ← get_pull_request / list_deployments /
//!     │                 list_deployment_statuses
//!     ▼
//! types.rs            ← PullRequest, Deployment, DeploymentStatus
//! ```
//!
//! Callers depend on [`DeploymentApi`] rather than on [`GithubClient`] so the
//! orchestration logic can be driven by in-memory fakes in tests.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use github_client::{DeploymentApi, GithubClient, Repository};
//!
//! let client = GithubClient::new(GithubClient::DEFAULT_API_URL, token)?;
//! let repo: Repository = "octo/site".parse()?;
//! let pr = client.get_pull_request(&repo, 42).await?;
//! let deployments = client.list_deployments(&repo, &pr.head.sha, None).await?;
//! ```

pub mod client;
pub mod error;
pub mod types;


pub use client::{DeploymentApi, GithubClient};
pub use error::GithubError;
pub use types::{
    Deployment, DeploymentState, DeploymentStatus, PullRequest, PullRequestHead, Repository,
};

/// Convenience `Result` alias for this crate.
pub type Result<T> = std::result::Result<T, GithubError>;
