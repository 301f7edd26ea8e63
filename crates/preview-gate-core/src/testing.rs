//! In-memory stand-ins for GitHub and the HTTP probe.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use github_client::{
    Deployment, DeploymentApi, DeploymentStatus, GithubError, PullRequest, PullRequestHead,
    Repository,
};

use crate::orchestrator::OutputSink;
use crate::reachability::{Probe, ProbeError};

fn api_error(status: u16, path: &str) -> GithubError {
    GithubError::Status {
        status,
        path: path.into(),
        message: "fake".into(),
    }
}

/// Scripted [`DeploymentApi`]. Status responses are consumed in order; the
/// last one repeats forever.
pub(crate) struct FakeApi {
    head_sha: String,
    pull_request_status: Option<u16>,
    pull_request_delay: Option<Duration>,
    deployments: Vec<Deployment>,
    statuses: Mutex<VecDeque<Vec<DeploymentStatus>>>,
    status_error_first: AtomicBool,
    pr_calls: AtomicUsize,
    deployment_calls: AtomicUsize,
    status_calls: AtomicUsize,
}

impl Default for FakeApi {
    fn default() -> Self {
        Self {
            head_sha: "abc123".into(),
            pull_request_status: None,
            pull_request_delay: None,
            deployments: vec![Deployment {
                id: 9,
                sha: "abc123".into(),
                environment: Some("Preview".into()),
                created_at: None,
            }],
            statuses: Mutex::new(VecDeque::new()),
            status_error_first: AtomicBool::new(false),
            pr_calls: AtomicUsize::new(0),
            deployment_calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
        }
    }
}

impl FakeApi {
    pub(crate) fn with_statuses(self, responses: Vec<Vec<DeploymentStatus>>) -> Self {
        *self.statuses.lock().unwrap() = responses.into();
        self
    }

    pub(crate) fn with_status_error_first(self) -> Self {
        self.status_error_first.store(true, Ordering::SeqCst);
        self
    }

    pub(crate) fn with_deployments(mut self, deployments: Vec<Deployment>) -> Self {
        self.deployments = deployments;
        self
    }

    pub(crate) fn with_pull_request_status(mut self, status: u16) -> Self {
        self.pull_request_status = Some(status);
        self
    }

    /// Every pull request fetch takes `delay` of (tokio) time.
    pub(crate) fn with_pull_request_delay(mut self, delay: Duration) -> Self {
        self.pull_request_delay = Some(delay);
        self
    }

    pub(crate) fn pr_calls(&self) -> usize {
        self.pr_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn deployment_calls(&self) -> usize {
        self.deployment_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DeploymentApi for FakeApi {
    async fn get_pull_request(
        &self,
        _repo: &Repository,
        number: u64,
    ) -> github_client::Result<PullRequest> {
        self.pr_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.pull_request_delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(status) = self.pull_request_status {
            return Err(api_error(status, "/pulls"));
        }
        Ok(PullRequest {
            number,
            head: PullRequestHead {
                sha: self.head_sha.clone(),
                branch: None,
            },
            title: None,
            html_url: None,
        })
    }

    async fn list_deployments(
        &self,
        _repo: &Repository,
        sha: &str,
        environment: Option<&str>,
    ) -> github_client::Result<Vec<Deployment>> {
        self.deployment_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .deployments
            .iter()
            .filter(|d| d.sha == sha)
            .filter(|d| environment.is_none() || d.environment.as_deref() == environment)
            .cloned()
            .collect())
    }

    async fn list_deployment_statuses(
        &self,
        _repo: &Repository,
        _deployment_id: u64,
    ) -> github_client::Result<Vec<DeploymentStatus>> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        if self.status_error_first.swap(false, Ordering::SeqCst) {
            return Err(api_error(502, "/statuses"));
        }
        let mut queue = self.statuses.lock().unwrap();
        let response = if queue.len() > 1 {
            queue.pop_front().unwrap_or_default()
        } else {
            queue.front().cloned().unwrap_or_default()
        };
        Ok(response)
    }
}

/// [`Probe`] that fails a fixed number of times before answering.
pub(crate) struct FakeProbe {
    failures_before_up: usize,
    calls: AtomicUsize,
}

impl FakeProbe {
    pub(crate) fn up_after(failures: usize) -> Self {
        Self {
            failures_before_up: failures,
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn never_up() -> Self {
        Self::up_after(usize::MAX)
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Probe for FakeProbe {
    async fn probe(&self, _url: &str) -> Result<u16, ProbeError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if n < self.failures_before_up {
            Err(ProbeError::Unreachable("connection refused".into()))
        } else {
            Ok(200)
        }
    }
}

/// [`OutputSink`] that remembers every output in order.
#[derive(Debug, Default)]
pub(crate) struct RecordedOutputs(pub Vec<(String, String)>);

impl OutputSink for RecordedOutputs {
    fn set_output(&mut self, name: &str, value: &str) -> crate::Result<()> {
        self.0.push((name.to_string(), value.to_string()));
        Ok(())
    }
}
