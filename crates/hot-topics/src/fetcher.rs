//! Single-shot HTTP fetcher wrapping reqwest.
//!
//! Not a browser — one GET per call, no retries. Timeout applies to the
//! whole request; any transport error, timeout or non-2xx status is a
//! `CrawlError::Network`.

use crate::error::{CrawlError, Result};
use std::time::Duration;
use tracing::{debug, info};

/// Default whole-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client shared by the static extractors.
#[derive(Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl Fetcher {
    /// Create a fetcher with the given request timeout.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| CrawlError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, timeout })
    }

    /// GET `url` with the given user-agent and return the body text.
    pub async fn fetch(&self, url: &str, user_agent: &str) -> Result<String> {
        info!(url, "fetching");

        let resp = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, user_agent)
            .header(
                reqwest::header::ACCEPT_LANGUAGE,
                "zh-CN,zh;q=0.9,en;q=0.8",
            )
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| CrawlError::network(url, describe(&e)))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(CrawlError::network(url, format!("HTTP status {status}")));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| CrawlError::network(url, describe(&e)))?;

        debug!(url, bytes = body.len(), "fetched");
        Ok(body)
    }
}

fn describe(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!("timed out: {e}")
    } else {
        e.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_returns_body_and_sends_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/top"))
            .and(header("user-agent", "agent-under-test"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>ok</p>"))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(DEFAULT_TIMEOUT).unwrap();
        let body = fetcher
            .fetch(&format!("{}/top", server.uri()), "agent-under-test")
            .await
            .unwrap();
        assert_eq!(body, "<p>ok</p>");
    }

    #[tokio::test]
    async fn test_non_success_status_is_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(DEFAULT_TIMEOUT).unwrap();
        let err = fetcher.fetch(&server.uri(), "ua").await.unwrap_err();
        match err {
            CrawlError::Network { reason, .. } => assert!(reason.contains("503")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_slow_response_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("late")
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(Duration::from_millis(50)).unwrap();
        let err = fetcher.fetch(&server.uri(), "ua").await.unwrap_err();
        assert!(matches!(err, CrawlError::Network { .. }));
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let fetcher = Fetcher::new(Duration::from_secs(1)).unwrap();
        let err = fetcher
            .fetch("http://127.0.0.1:9/unreachable", "ua")
            .await
            .unwrap_err();
        assert!(matches!(err, CrawlError::Network { .. }));
    }
}
