//! Upstream metrics fetch
//!
//! One blocking-per-request text fetch to the configured exposition endpoint
//! with a fixed timeout. No retries: a failed fetch is reported once and the
//! request ends without ever invoking the converter.

use std::time::Duration;

use async_trait::async_trait;
use common::config::UpstreamConfig;
use thiserror::Error;

/// Errors from the upstream fetch
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The upstream answered with a non-success status
    #[error("HTTP {0}")]
    Status(u16),
    /// Transport-level failure (connect, timeout, TLS, ...)
    #[error("{0}")]
    Transport(String),
}

/// Seam between the HTTP handlers and the upstream endpoint
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetricsSource: Send + Sync {
    /// Fetch the full exposition response body
    async fn fetch(&self) -> Result<String, UpstreamError>;
}

/// Production source backed by a reqwest client
pub struct HttpMetricsSource {
    client: reqwest::Client,
    url: String,
}

impl HttpMetricsSource {
    pub fn new(config: &UpstreamConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(5))
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()?;

        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }
}

#[async_trait]
impl MetricsSource for HttpMetricsSource {
    async fn fetch(&self) -> Result<String, UpstreamError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status(status.as_u16()));
        }

        response
            .text()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(UpstreamError::Status(503).to_string(), "HTTP 503");
        assert_eq!(
            UpstreamError::Transport("connection refused".to_string()).to_string(),
            "connection refused"
        );
    }

    #[test]
    fn test_client_builds_from_default_config() {
        let source = HttpMetricsSource::new(&UpstreamConfig::default()).unwrap();
        assert_eq!(source.url, "http://127.0.0.1:9090/metrics");
    }
}
