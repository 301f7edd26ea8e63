use std::fmt;
use std::future::Future;
use std::time::Duration;

use crate::error::{GateError, Result};

// ---------------------------------------------------------------------------
// PollBudget
// ---------------------------------------------------------------------------

/// Total wait and per-attempt spacing for one polling stage.
///
/// The number of attempts is the total budget divided by the spacing,
/// rounded up: 60 s at a 2000 ms interval gives 30 attempts, 5 s at 2000 ms
/// gives 3. Every failed attempt is followed by one full interval, so an
/// exhausted stage takes `iteration_count * check_interval`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollBudget {
    max_timeout: Duration,
    check_interval: Duration,
}

impl PollBudget {
    pub fn new(max_timeout: Duration, check_interval: Duration) -> Self {
        Self {
            max_timeout,
            check_interval,
        }
    }

    pub fn max_timeout(&self) -> Duration {
        self.max_timeout
    }

    pub fn check_interval(&self) -> Duration {
        self.check_interval
    }

    /// `max_timeout_seconds / (check_interval_ms / 1000)`, rounded up.
    ///
    /// A zero interval yields zero iterations.
    pub fn iteration_count(&self) -> u64 {
        let interval = self.check_interval.as_nanos();
        if interval == 0 {
            return 0;
        }
        let iterations = self.max_timeout.as_nanos().div_ceil(interval);
        u64::try_from(iterations).unwrap_or(u64::MAX)
    }
}

// ---------------------------------------------------------------------------
// Bounded poll loop
// ---------------------------------------------------------------------------

/// Result of a successful [`poll`]: the value and the 1-indexed attempt that
/// produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Polled<T> {
    pub value: T,
    pub attempts: u64,
}

/// Run `attempt` until it returns `Ok`, at most `budget.iteration_count()`
/// times, sleeping `budget.check_interval()` after every failure.
///
/// Attempt errors mean "not ready yet": they are logged and never returned.
/// When the budget is spent the result is [`GateError::Timeout`] carrying
/// `awaiting`.
///
/// The closure receives the 1-indexed attempt number.
pub async fn poll<T, E, F, Fut>(budget: PollBudget, awaiting: &str, mut attempt: F) -> Result<Polled<T>>
where
    F: FnMut(u64) -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
    E: fmt::Display,
{
    let iterations = budget.iteration_count();

    for n in 1..=iterations {
        match attempt(n).await {
            Ok(value) => {
                tracing::debug!(attempt = n, of = iterations, "ready");
                return Ok(Polled { value, attempts: n });
            }
            Err(reason) => {
                tracing::info!(attempt = n, of = iterations, %reason, "not ready, retrying");
                tokio::time::sleep(budget.check_interval).await;
            }
        }
    }

    tracing::warn!(attempts = iterations, "{awaiting}: budget exhausted");
    Err(GateError::Timeout(awaiting.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
