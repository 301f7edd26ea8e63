use std::path::PathBuf;

use anyhow::{Context, Result};
use github_client::{GithubClient, Repository};
use preview_gate_core::{
    ActionConfig, ActionInputs, EventContext, GateError, GateOutcome, HttpProbe, Orchestrator,
};
use serde::Serialize;

use crate::output::ActionOutputs;

/// Where the run gets its repository, pull request and API endpoint from.
#[derive(Debug)]
pub struct RunTarget {
    pub repository: Option<String>,
    pub event_path: Option<PathBuf>,
    pub pr_number: Option<u64>,
    pub api_url: String,
    pub output_file: Option<PathBuf>,
}

/// JSON shape printed by `--json`.
#[derive(Debug, Serialize)]
pub struct Summary {
    pub url: String,
    pub deployment_id: u64,
    pub head_sha: String,
    pub environment: Option<String>,
    pub restarts: u32,
    pub status_attempts: u64,
    pub probe_attempts: u64,
    pub http_status: u16,
}

impl From<GateOutcome> for Summary {
    fn from(o: GateOutcome) -> Self {
        Self {
            url: o.url,
            deployment_id: o.deployment.deployment_id,
            head_sha: o.deployment.head_sha,
            environment: o.deployment.environment,
            restarts: o.restarts,
            status_attempts: o.status_attempts,
            probe_attempts: o.probe_attempts,
            http_status: o.http_status,
        }
    }
}

/// Validate inputs, then drive the orchestrator to completion.
///
/// Configuration is checked before any client is built, so a missing token
/// or pull request fails without touching the network.
pub fn run(inputs: &ActionInputs, target: RunTarget) -> Result<Summary> {
    let config = ActionConfig::resolve(inputs)?;

    let repository: Repository = non_empty(target.repository.as_deref())
        .ok_or(GateError::MissingInput("repository"))?
        .parse()?;
    let event_path = target.event_path.filter(|p| !p.as_os_str().is_empty());
    let ctx = EventContext::load(repository, event_path.as_deref())?
        .with_pull_request_override(target.pr_number);
    ctx.pull_request_number()?;

    let api_url = non_empty(Some(target.api_url.as_str())).unwrap_or(GithubClient::DEFAULT_API_URL);
    let client = GithubClient::new(api_url, &config.token).context("building GitHub client")?;
    let probe = HttpProbe::new(config.budget.max_timeout())?;
    let mut outputs = ActionOutputs::new(target.output_file.filter(|p| !p.as_os_str().is_empty()));

    tracing::info!(
        repository = %ctx.repository,
        environment = config.environment.as_deref().unwrap_or("any"),
        max_timeout_secs = config.budget.max_timeout().as_secs_f64(),
        check_interval_ms = config.budget.check_interval().as_millis() as u64,
        iterations = config.budget.iteration_count(),
        "waiting for preview deployment"
    );

    let rt = tokio::runtime::Runtime::new()?;
    let outcome = rt.block_on(Orchestrator::new(&client, &probe, &config).run(&ctx, &mut outputs))?;

    Ok(outcome.into())
}

fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}
