use github_client::{DeploymentApi, DeploymentState, DeploymentStatus, GithubError, Repository};
use thiserror::Error;

use crate::error::Result;
use crate::poller::{poll, PollBudget, Polled};

/// Message carried by the timeout when no acceptable status shows up.
pub const STATUS_TIMEOUT: &str = "Unable to wait for a deployment to be successful";

// ---------------------------------------------------------------------------
// DeploymentRef
// ---------------------------------------------------------------------------

/// The deployment under observation: the most recent one GitHub returned for
/// the pull request's head commit and the configured environment.
#[derive(Debug, Clone, PartialEq)]
pub struct DeploymentRef {
    pub repo: Repository,
    pub deployment_id: u64,
    pub head_sha: String,
    pub environment: Option<String>,
}

// ---------------------------------------------------------------------------
// AcceptancePolicy / Classification
// ---------------------------------------------------------------------------

/// Which deployment states end status polling successfully.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AcceptancePolicy {
    /// Treat `inactive` like `success`. Some providers mark static
    /// deployments inactive as soon as they are live.
    pub allow_inactive: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Accepted,
    NotYet(DeploymentState),
}

impl AcceptancePolicy {
    pub fn classify(&self, status: &DeploymentStatus) -> Classification {
        match status.state {
            DeploymentState::Inactive if self.allow_inactive => Classification::Accepted,
            DeploymentState::Success => Classification::Accepted,
            other => Classification::NotYet(other),
        }
    }
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Why one status attempt did not produce an acceptable status.
#[derive(Debug, Error)]
enum StatusPending {
    #[error("deployment statuses unavailable: {0}")]
    Api(#[from] GithubError),

    #[error("No status was available")]
    Empty,

    #[error("No status with state \"success\" was available (latest: {0})")]
    State(DeploymentState),
}

/// Poll the deployment's statuses until the most recent one is accepted by
/// `policy`, returning that status unchanged.
///
/// API failures, an empty status list and non-terminal states all count as
/// "not yet" and are retried within `budget`.
pub async fn wait_for_status(
    api: &dyn DeploymentApi,
    deployment: &DeploymentRef,
    policy: AcceptancePolicy,
    budget: PollBudget,
) -> Result<Polled<DeploymentStatus>> {
    tracing::info!(
        deployment_id = deployment.deployment_id,
        sha = %deployment.head_sha,
        allow_inactive = policy.allow_inactive,
        "waiting for deployment status"
    );

    poll(budget, STATUS_TIMEOUT, |_| check_once(api, deployment, policy)).await
}

async fn check_once(
    api: &dyn DeploymentApi,
    deployment: &DeploymentRef,
    policy: AcceptancePolicy,
) -> std::result::Result<DeploymentStatus, StatusPending> {
    let statuses = api
        .list_deployment_statuses(&deployment.repo, deployment.deployment_id)
        .await?;
    let latest = statuses.into_iter().next().ok_or(StatusPending::Empty)?;

    match policy.classify(&latest) {
        Classification::Accepted => {
            tracing::info!(
                status_id = latest.id,
                state = %latest.state,
                description = latest.description.as_deref().unwrap_or("-"),
                log_url = latest.log_url.as_deref().unwrap_or("-"),
                created_at = ?latest.created_at,
                "deployment status accepted"
            );
            Ok(latest)
        }
        Classification::NotYet(state) => Err(StatusPending::State(state)),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
