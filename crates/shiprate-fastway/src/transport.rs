//! The boundary between the quoting pipeline and the network.

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, Url};
use shiprate_core::AppConfig;

use crate::error::{FastwayError, TransportError};
use crate::retry::retry_with_backoff;

/// Fetches the body behind one URL.
///
/// A body returned with a non-2xx status is still a body: carrier error
/// payloads often arrive that way, and the parser decides what they mean.
/// Timeouts and retries belong to the implementation.
pub trait Transport: Send + Sync {
    fn fetch(&self, url: &Url) -> impl Future<Output = Result<String, TransportError>> + Send;
}

/// [`Transport`] over `reqwest`, retrying network failures with back-off.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl HttpTransport {
    /// # Errors
    ///
    /// Returns [`FastwayError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, FastwayError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            max_retries,
            backoff_base_ms,
        })
    }

    /// # Errors
    ///
    /// Returns [`FastwayError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn from_config(config: &AppConfig) -> Result<Self, FastwayError> {
        Self::new(
            config.request_timeout_secs,
            &config.user_agent,
            config.max_retries,
            config.retry_backoff_base_ms,
        )
    }

    async fn fetch_once(&self, url: &Url) -> Result<String, TransportError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            return Ok(body);
        }
        if body.trim().is_empty() {
            return Err(TransportError::from_status(status.as_u16(), None));
        }
        tracing::warn!(
            status = status.as_u16(),
            "Fastway answered with a non-success status; passing the body to the parser"
        );
        Ok(body)
    }
}

impl Transport for HttpTransport {
    async fn fetch(&self, url: &Url) -> Result<String, TransportError> {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || self.fetch_once(url)).await
    }
}
