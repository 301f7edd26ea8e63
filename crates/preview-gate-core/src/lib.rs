//! Wait for a pull request's preview deployment to succeed, then for its URL
//! to answer.
//!
//! The two waits share one engine, [`poller::poll`]: a fixed number of
//! attempts spaced by a fixed interval, where every attempt failure means
//! "not ready yet". [`orchestrator::Orchestrator`] strings them together.

pub mod config;
pub mod context;
pub mod error;
pub mod orchestrator;
pub mod poller;
pub mod reachability;
pub mod status;

#[cfg(test)]
mod testing;

pub use config::{ActionConfig, ActionInputs};
pub use context::EventContext;
pub use error::{GateError, Result};
pub use orchestrator::{GateOutcome, Orchestrator, OutputSink, URL_OUTPUT};
pub use poller::{poll, PollBudget, Polled};
pub use reachability::{wait_for_url, HttpProbe, Probe, ProbeError};
pub use status::{wait_for_status, AcceptancePolicy, Classification, DeploymentRef};
