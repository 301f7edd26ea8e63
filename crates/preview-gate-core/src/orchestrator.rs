use github_client::{DeploymentApi, Repository};
use tokio::time::Instant;

use crate::config::ActionConfig;
use crate::context::EventContext;
use crate::error::{GateError, Result};
use crate::reachability::{wait_for_url, Probe};
use crate::status::{wait_for_status, DeploymentRef};

/// Name of the output carrying the preview URL.
pub const URL_OUTPUT: &str = "url";

/// Where step outputs go. The CLI writes them to `GITHUB_OUTPUT`.
pub trait OutputSink {
    fn set_output(&mut self, name: &str, value: &str) -> Result<()>;
}

/// Everything a successful run observed.
#[derive(Debug, Clone, PartialEq)]
pub struct GateOutcome {
    pub url: String,
    pub deployment: DeploymentRef,
    /// Discovery passes thrown away because the status carried no URL.
    pub restarts: u32,
    /// Status attempts in the final discovery pass.
    pub status_attempts: u64,
    pub probe_attempts: u64,
    /// HTTP status code of the response that proved the URL reachable.
    pub http_status: u16,
}

/// Drives one pull request from "which deployment?" to "its URL answers".
///
/// ```text
/// PR number ─▶ fetch PR ─▶ list deployments ─▶ wait for status
///                 ▲                                   │
///                 └──────── no URL: restart ◀─────────┤
///                                                     ▼
///                              publish `url` ─▶ wait for URL
/// ```
///
/// Restarts are capped by `max_restarts` and by a wall-clock allowance of
/// `(max_restarts + 1) * max_timeout`.
pub struct Orchestrator<'a> {
    api: &'a dyn DeploymentApi,
    probe: &'a dyn Probe,
    config: &'a ActionConfig,
}

impl<'a> Orchestrator<'a> {
    pub fn new(api: &'a dyn DeploymentApi, probe: &'a dyn Probe, config: &'a ActionConfig) -> Self {
        Self { api, probe, config }
    }

    pub async fn run(&self, ctx: &EventContext, outputs: &mut dyn OutputSink) -> Result<GateOutcome> {
        let pr_number = ctx.pull_request_number()?;
        let budget = self.config.budget;
        let max_restarts = self.config.max_restarts;
        let restart_allowance = budget
            .max_timeout()
            .saturating_mul(max_restarts.saturating_add(1));
        let started = Instant::now();

        let mut restarts = 0u32;
        let (deployment, url, status_attempts) = loop {
            let deployment = self.discover(&ctx.repository, pr_number).await?;
            let polled =
                wait_for_status(self.api, &deployment, self.config.policy, budget).await?;

            if let Some(url) = polled.value.url() {
                break (deployment, url.to_string(), polled.attempts);
            }

            if restarts >= max_restarts || started.elapsed() >= restart_allowance {
                return Err(GateError::NoTargetUrl { restarts });
            }
            restarts += 1;
            tracing::warn!(
                deployment_id = deployment.deployment_id,
                restart = restarts,
                of = max_restarts,
                "no status found, running again"
            );
        };

        tracing::info!("target url » {url}");
        outputs.set_output(URL_OUTPUT, &url)?;

        let reached = wait_for_url(self.probe, &url, budget).await?;

        Ok(GateOutcome {
            url,
            deployment,
            restarts,
            status_attempts,
            probe_attempts: reached.attempts,
            http_status: reached.value,
        })
    }

    /// Fetch the pull request and pick the most recent deployment of its
    /// head commit.
    async fn discover(&self, repo: &Repository, pr_number: u64) -> Result<DeploymentRef> {
        let pr = self
            .api
            .get_pull_request(repo, pr_number)
            .await
            .map_err(GateError::PullRequest)?;
        tracing::info!(pr = pr_number, sha = %pr.head.sha, "resolved pull request head");

        let environment = self.config.environment.as_deref();
        let deployments = self
            .api
            .list_deployments(repo, &pr.head.sha, environment)
            .await
            .map_err(GateError::Deployments)?;

        let deployment = deployments
            .into_iter()
            .next()
            .ok_or_else(|| GateError::NoDeployments {
                repo: repo.to_string(),
                sha: pr.head.sha.clone(),
                environment: self.config.environment.clone(),
            })?;
        tracing::info!(
            deployment_id = deployment.id,
            environment = deployment.environment.as_deref().unwrap_or("-"),
            "selected deployment"
        );

        Ok(DeploymentRef {
            repo: repo.clone(),
            deployment_id: deployment.id,
            head_sha: pr.head.sha,
            environment: deployment.environment,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
