use thiserror::Error;

#[derive(Debug, Error)]
pub enum GithubError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GitHub API returned {status} for {path}: {message}")]
    Status {
        status: u16,
        path: String,
        message: String,
    },

    #[error("Failed to parse response from {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("token contains characters not allowed in an HTTP header")]
    InvalidToken,

    #[error("invalid repository '{0}': expected owner/repo")]
    InvalidRepository(String),
}
