mod output;
mod run;

use clap::Parser;
use github_client::GithubClient;
use preview_gate_core::{ActionInputs, GateError};
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "preview-gate",
    about = "Wait for a pull request's preview deployment to succeed and its URL to answer",
    version
)]
struct Cli {
    /// GitHub token used to read pull requests and deployments
    #[arg(long, env = "INPUT_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Only consider deployments to this environment
    #[arg(long, env = "INPUT_ENVIRONMENT")]
    environment: Option<String>,

    /// Seconds to wait for each stage (status, then URL) [default: 60]
    #[arg(long, env = "INPUT_MAX_TIMEOUT")]
    max_timeout: Option<String>,

    /// Accept `inactive` as a successful deployment state [default: false]
    #[arg(long, env = "INPUT_ALLOW_INACTIVE")]
    allow_inactive: Option<String>,

    /// Seconds between attempts [default: 2]
    #[arg(long, env = "INPUT_CHECK_INTERVAL")]
    check_interval: Option<String>,

    /// How often to start over when a status has no URL [default: 5]
    #[arg(long, env = "INPUT_MAX_RESTARTS")]
    max_restarts: Option<String>,

    /// Repository as owner/repo
    #[arg(long, env = "GITHUB_REPOSITORY")]
    repository: Option<String>,

    /// Path to the triggering event payload
    #[arg(long, env = "GITHUB_EVENT_PATH")]
    event_path: Option<PathBuf>,

    /// Pull request number (overrides the event payload)
    #[arg(long)]
    pr_number: Option<u64>,

    /// GitHub REST API base URL
    #[arg(long, env = "GITHUB_API_URL", default_value = GithubClient::DEFAULT_API_URL)]
    api_url: String,

    /// File that step outputs are appended to
    #[arg(long, env = "GITHUB_OUTPUT")]
    output_file: Option<PathBuf>,

    /// Print a JSON summary on success
    #[arg(long, short = 'j')]
    json: bool,
}

fn main() {
    let cli = Cli::parse();

    // stdout carries workflow commands; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(
            &std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_default(),
        ))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let inputs = ActionInputs {
        token: cli.token,
        environment: cli.environment,
        max_timeout: cli.max_timeout,
        allow_inactive: cli.allow_inactive,
        check_interval: cli.check_interval,
        max_restarts: cli.max_restarts,
    };
    let target = run::RunTarget {
        repository: cli.repository,
        event_path: cli.event_path,
        pr_number: cli.pr_number,
        api_url: cli.api_url,
        output_file: cli.output_file,
    };

    let result = run::run(&inputs, target).and_then(|summary| {
        if cli.json {
            output::print_json(&summary)?;
        }
        Ok(())
    });

    if let Err(e) = result {
        if e
            .downcast_ref::<GateError>()
            .is_some_and(GateError::is_configuration)
        {
            tracing::error!("invalid action configuration, nothing was requested from GitHub");
        }
        output::report_failure(&format!("{e:#}"));
        std::process::exit(1);
    }
}

/// `RUST_LOG` directives, with `info` when none are given.
fn log_filter(directives: &str) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .parse_lossy(directives)
}
