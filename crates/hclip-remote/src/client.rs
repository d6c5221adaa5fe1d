//! Shared HTTP plumbing for the remote service clients.

use std::num::ParseIntError;
use std::str::FromStr;
use std::time::Duration;

use reqwest::{Client, Response};
use tracing::warn;

use crate::error::{RemoteError, RemoteResult};
use crate::types::HealthResponse;

/// Configuration for one remote service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Base URL of the service
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Max retries for transient failures
    pub max_retries: u32,
    /// Delay between job status polls
    pub poll_interval: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8001".to_string(),
            timeout: Duration::from_secs(300), // 5 minutes for long analyses
            max_retries: 2,
            poll_interval: Duration::from_millis(2000),
        }
    }
}

impl ServiceConfig {
    /// Create config from environment variables, reading the base URL from `url_var`.
    ///
    /// Numeric settings that are set but malformed are rejected.
    pub fn from_env(url_var: &str) -> RemoteResult<Self> {
        let defaults = Self::default();
        Ok(Self {
            base_url: std::env::var(url_var).unwrap_or(defaults.base_url),
            timeout: env_number("HCLIP_REMOTE_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            max_retries: env_number("HCLIP_REMOTE_RETRIES")?.unwrap_or(defaults.max_retries),
            poll_interval: env_number("HCLIP_POLL_INTERVAL_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.poll_interval),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

/// HTTP client bound to one service base URL.
#[derive(Debug, Clone)]
pub struct ServiceClient {
    http: Client,
    config: ServiceConfig,
}

impl ServiceClient {
    pub fn new(config: ServiceConfig) -> RemoteResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(RemoteError::Network)?;

        Ok(Self { http, config })
    }

    pub fn http(&self) -> &Client {
        &self.http
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Absolute URL for `path` (which starts with `/`).
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Check if the service is healthy.
    pub async fn health_check(&self) -> RemoteResult<bool> {
        let url = self.url("/health");

        match self.http.get(&url).send().await {
            Ok(response) if response.status().is_success() => {
                let health: HealthResponse = response.json().await?;
                Ok(health.status == "healthy" || health.status == "ok")
            }
            Ok(response) => {
                warn!("Service health check failed: {}", response.status());
                Ok(false)
            }
            Err(e) => {
                warn!("Service health check error: {}", e);
                Ok(false)
            }
        }
    }

    /// Execute with retry logic.
    pub(crate) async fn with_retry<F, Fut, T>(&self, operation: F) -> RemoteResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = RemoteResult<T>>,
    {
        let mut attempt = 0u32;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    let delay = Duration::from_millis(500 * 2u64.pow(attempt));
                    warn!(
                        "Remote request failed (attempt {}), retrying in {:?}: {}",
                        attempt + 1,
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

fn env_number<T: FromStr<Err = ParseIntError>>(name: &str) -> RemoteResult<Option<T>> {
    match std::env::var(name) {
        Ok(raw) => parse_number(name, &raw).map(Some),
        Err(_) => Ok(None),
    }
}

fn parse_number<T: FromStr<Err = ParseIntError>>(name: &str, raw: &str) -> RemoteResult<T> {
    raw.trim()
        .parse()
        .map_err(|e| RemoteError::Config(format!("{}={:?}: {}", name, raw, e)))
}

/// Turn a non-success response into an error, keeping the body for context.
pub(crate) async fn ensure_success(response: Response) -> RemoteResult<Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(RemoteError::from_status(status, body))
}
