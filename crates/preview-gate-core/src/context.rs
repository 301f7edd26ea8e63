use std::path::Path;

use github_client::Repository;
use serde::Deserialize;

use crate::error::{GateError, Result};

/// What the triggering workflow run tells us: which repository, and which
/// pull request (if the event was about one).
#[derive(Debug, Clone, PartialEq)]
pub struct EventContext {
    pub repository: Repository,
    pub pull_request_number: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct EventPayload {
    #[serde(default)]
    pull_request: Option<PullRequestEvent>,
}

#[derive(Debug, Deserialize)]
struct PullRequestEvent {
    number: u64,
}

impl EventContext {
    pub fn new(repository: Repository, pull_request_number: Option<u64>) -> Self {
        Self {
            repository,
            pull_request_number,
        }
    }

    /// Read the webhook payload at `event_path` (`GITHUB_EVENT_PATH`).
    ///
    /// A missing path leaves the pull request number unset; a path that
    /// cannot be read or parsed is an error.
    pub fn load(repository: Repository, event_path: Option<&Path>) -> Result<Self> {
        let Some(path) = event_path else {
            return Ok(Self::new(repository, None));
        };

        let raw = std::fs::read_to_string(path).map_err(|source| GateError::EventRead {
            path: path.to_path_buf(),
            source,
        })?;
        let payload: EventPayload =
            serde_json::from_str(&raw).map_err(|source| GateError::EventParse {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Self::new(
            repository,
            payload.pull_request.map(|pr| pr.number),
        ))
    }

    /// Replace the pull request number when `number` is set.
    pub fn with_pull_request_override(mut self, number: Option<u64>) -> Self {
        if number.is_some() {
            self.pull_request_number = number;
        }
        self
    }

    pub fn pull_request_number(&self) -> Result<u64> {
        self.pull_request_number
            .ok_or(GateError::NoPullRequestNumber)
    }
}
