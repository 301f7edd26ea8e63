use std::time::Duration;

use crate::error::{GateError, Result};
use crate::poller::PollBudget;
use crate::status::AcceptancePolicy;

pub const DEFAULT_MAX_TIMEOUT_SECS: f64 = 60.0;
pub const DEFAULT_CHECK_INTERVAL_SECS: f64 = 2.0;
pub const DEFAULT_MAX_RESTARTS: u32 = 5;

// ---------------------------------------------------------------------------
// ActionInputs
// ---------------------------------------------------------------------------

/// Raw action inputs exactly as the runner hands them over (`INPUT_*`
/// variables or CLI flags). Nothing here is validated yet.
#[derive(Debug, Clone, Default)]
pub struct ActionInputs {
    pub token: Option<String>,
    pub environment: Option<String>,
    pub max_timeout: Option<String>,
    pub allow_inactive: Option<String>,
    pub check_interval: Option<String>,
    pub max_restarts: Option<String>,
}

// ---------------------------------------------------------------------------
// ActionConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ActionConfig {
    pub token: String,
    pub environment: Option<String>,
    /// Shared by the status stage and the URL stage.
    pub budget: PollBudget,
    pub policy: AcceptancePolicy,
    pub max_restarts: u32,
}

impl ActionConfig {
    /// Validate `inputs` and apply defaults.
    ///
    /// Numeric inputs that are missing, unparsable, zero or negative fall
    /// back to their defaults rather than failing the run.
    pub fn resolve(inputs: &ActionInputs) -> Result<Self> {
        let token = non_empty(inputs.token.as_deref())
            .ok_or(GateError::MissingInput("token"))?
            .to_string();

        let max_timeout = positive_or(inputs.max_timeout.as_deref(), DEFAULT_MAX_TIMEOUT_SECS);
        let check_interval =
            positive_or(inputs.check_interval.as_deref(), DEFAULT_CHECK_INTERVAL_SECS);
        // The interval is carried in whole milliseconds.
        let check_interval_ms = (check_interval * 1000.0).round().max(1.0);

        let budget = PollBudget::new(
            Duration::try_from_secs_f64(max_timeout).unwrap_or(Duration::MAX),
            Duration::try_from_secs_f64(check_interval_ms / 1000.0).unwrap_or(Duration::MAX),
        );

        let allow_inactive = parse_bool("allow_inactive", inputs.allow_inactive.as_deref())?;

        let max_restarts = match non_empty(inputs.max_restarts.as_deref()) {
            None => DEFAULT_MAX_RESTARTS,
            Some(raw) => raw.parse::<u32>().map_err(|e| GateError::InvalidInput {
                input: "max_restarts",
                value: raw.to_string(),
                reason: e.to_string(),
            })?,
        };

        Ok(Self {
            token,
            environment: non_empty(inputs.environment.as_deref()).map(str::to_owned),
            budget,
            policy: AcceptancePolicy { allow_inactive },
            max_restarts,
        })
    }
}

fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

fn positive_or(raw: Option<&str>, default: f64) -> f64 {
    non_empty(raw)
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|n| n.is_finite() && *n > 0.0)
        .unwrap_or(default)
}

/// YAML 1.2 core-schema booleans, as accepted by GitHub Actions inputs.
/// Empty or missing means `false`.
fn parse_bool(input: &'static str, raw: Option<&str>) -> Result<bool> {
    match non_empty(raw) {
        None => Ok(false),
        Some("true" | "True" | "TRUE") => Ok(true),
        Some("false" | "False" | "FALSE") => Ok(false),
        Some(other) => Err(GateError::InvalidInput {
            input,
            value: other.to_string(),
            reason: "expected one of true | True | TRUE | false | False | FALSE".into(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
