use github_client::GithubError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GateError {
    #[error("Required field `{0}` was not provided")]
    MissingInput(&'static str),

    #[error("invalid value '{value}' for input `{input}`: {reason}")]
    InvalidInput {
        input: &'static str,
        value: String,
        reason: String,
    },

    #[error("No pull request number was found")]
    NoPullRequestNumber,

    #[error("could not read event payload {}", .path.display())]
    EventRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid event payload {}", .path.display())]
    EventParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Could not get information about the current pull request")]
    PullRequest(#[source] GithubError),

    #[error("could not list deployments")]
    Deployments(#[source] GithubError),

    #[error(
        "no deployments in {repo} for commit {sha} (environment: {})",
        .environment.as_deref().unwrap_or("any")
    )]
    NoDeployments {
        repo: String,
        sha: String,
        environment: Option<String>,
    },

    #[error("Timeout reached: {0}")]
    Timeout(String),

    #[error("exhausted {restarts} restarts without a deployment URL")]
    NoTargetUrl { restarts: u32 },

    #[error("could not publish output `{name}`")]
    Output {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not build HTTP client")]
    HttpClient(#[source] reqwest::Error),

    #[error(transparent)]
    Github(#[from] GithubError),
}

impl GateError {
    /// `true` for errors raised before any network call was made.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            GateError::MissingInput(_)
                | GateError::InvalidInput { .. }
                | GateError::NoPullRequestNumber
                | GateError::EventRead { .. }
                | GateError::EventParse { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, GateError>;
