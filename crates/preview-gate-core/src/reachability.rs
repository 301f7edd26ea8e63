use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::error::{GateError, Result};
use crate::poller::{poll, PollBudget, Polled};

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Url unavailable: {0}")]
    Http(#[from] reqwest::Error),

    /// For [`Probe`] implementations that do not go through reqwest.
    #[error("Url unavailable: {0}")]
    Unreachable(String),
}

/// One reachability check against a URL.
///
/// `Ok` carries the HTTP status code of whatever answered. Any answer counts:
/// a 404 still proves the host is serving.
#[async_trait]
pub trait Probe: Send + Sync {
    async fn probe(&self, url: &str) -> std::result::Result<u16, ProbeError>;
}

/// [`Probe`] backed by a plain `GET`. The body is never read.
pub struct HttpProbe {
    http: reqwest::Client,
}

impl HttpProbe {
    /// `request_timeout` bounds a single GET, including connecting.
    pub fn new(request_timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(GateError::HttpClient)?;
        Ok(Self { http })
    }
}

#[async_trait]
impl Probe for HttpProbe {
    async fn probe(&self, url: &str) -> std::result::Result<u16, ProbeError> {
        let response = self.http.get(url).send().await?;
        Ok(response.status().as_u16())
    }
}

/// Probe `url` until anything answers, within `budget`.
pub async fn wait_for_url(probe: &dyn Probe, url: &str, budget: PollBudget) -> Result<Polled<u16>> {
    tracing::info!(%url, "waiting for a response");

    let awaiting = format!("Unable to connect to {url}");
    let polled = poll(budget, &awaiting, |_| probe.probe(url)).await?;

    tracing::info!(%url, status = polled.value, attempts = polled.attempts, "url is reachable");
    Ok(polled)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeProbe;

    fn budget() -> PollBudget {
        PollBudget::new(Duration::from_secs(6), Duration::from_millis(2000))
    }

    #[tokio::test]
    async fn ok_and_not_found_both_count_as_up() {
        let mut server = mockito::Server::new_async().await;
        let _ok = server.mock("GET", "/ok").with_status(200).create_async().await;
        let _missing = server.mock("GET", "/missing").with_status(404).create_async().await;

        let probe = HttpProbe::new(Duration::from_secs(5)).unwrap();

        let ok = wait_for_url(&probe, &format!("{}/ok", server.url()), budget())
            .await
            .unwrap();
        assert_eq!(ok, Polled { value: 200, attempts: 1 });

        let missing = wait_for_url(&probe, &format!("{}/missing", server.url()), budget())
            .await
            .unwrap();
        assert_eq!(missing, Polled { value: 404, attempts: 1 });
    }

    #[tokio::test]
    async fn connection_refused_is_not_up() {
        let probe = HttpProbe::new(Duration::from_secs(5)).unwrap();
        let err = probe.probe("http://127.0.0.1:1/").await.unwrap_err();
        assert!(matches!(err, ProbeError::Http(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn retries_until_the_probe_answers() {
        let probe = FakeProbe::up_after(2);
        let polled = wait_for_url(&probe, "https://preview.example/pr-42", budget())
            .await
            .unwrap();
        assert_eq!(polled.attempts, 3);
        assert_eq!(probe.calls(), 3);
    }

    #[test]
    fn unreachable_reason_is_shown() {
        let err = ProbeError::Unreachable("connection refused".into());
        assert_eq!(err.to_string(), "Url unavailable: connection refused");
    }

    #[tokio::test(start_paused = true)]
    async fn never_reachable_times_out_naming_the_url() {
        let probe = FakeProbe::never_up();
        let err = wait_for_url(&probe, "https://preview.example/pr-42", budget())
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Timeout reached: Unable to connect to https://preview.example/pr-42"
        );
        assert_eq!(probe.calls(), budget().iteration_count() as usize);
    }
}
