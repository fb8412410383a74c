//! HTTP transport for search pages with rate limiting
//!
//! Implements the `PageFetcher` port on top of reqwest. Retries are not
//! attempted here; a failed fetch ends the query with partial results.

use std::num::NonZeroU32;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use governor::{
    clock::DefaultClock,
    state::{direct::NotKeyed, InMemoryState},
    Quota, RateLimiter,
};
use reqwest::Client;

use crate::domain::services::{FetchError, FetchedPage, PageFetcher, RequestHeaders};
use crate::infrastructure::config::{defaults, AdvancedConfig};

/// HTTP client configuration for search page fetching
#[derive(Debug, Clone, serde::Serialize)]
pub struct HttpClientConfig {
    pub timeout_seconds: u64,
    pub max_requests_per_second: u32,
    pub follow_redirects: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: defaults::REQUEST_TIMEOUT_SECONDS,
            max_requests_per_second: defaults::MAX_REQUESTS_PER_SECOND,
            follow_redirects: true,
        }
    }
}

impl From<&AdvancedConfig> for HttpClientConfig {
    fn from(advanced: &AdvancedConfig) -> Self {
        Self {
            timeout_seconds: advanced.request_timeout_seconds,
            max_requests_per_second: advanced.max_requests_per_second,
            ..Self::default()
        }
    }
}

/// Rate-limited HTTP client shared by all queries of a process
pub struct HttpClient {
    client: Client,
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    config: HttpClientConfig,
}

impl HttpClient {
    /// Create a new HTTP client with the given configuration
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .brotli(true)
            .cookie_store(true)
            .redirect(if config.follow_redirects {
                reqwest::redirect::Policy::limited(10)
            } else {
                reqwest::redirect::Policy::none()
            })
            .build()
            .context("Failed to create HTTP client")?;

        let quota = Quota::per_second(
            NonZeroU32::new(config.max_requests_per_second)
                .context("Rate limit must be greater than 0")?,
        );
        let rate_limiter = RateLimiter::direct(quota);

        Ok(Self {
            client,
            rate_limiter,
            config,
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    fn transport_error(url: &str, error: &reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else {
            FetchError::Transport {
                url: url.to_string(),
                message: error.to_string(),
            }
        }
    }
}

#[async_trait]
impl PageFetcher for HttpClient {
    async fn fetch(&self, url: &str, headers: &RequestHeaders) -> Result<FetchedPage, FetchError> {
        self.rate_limiter.until_ready().await;

        tracing::info!("Fetching URL: {}", url);

        let mut request = self.client.get(url);
        for (name, value) in headers.pairs() {
            request = request.header(name, value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Self::transport_error(url, &e))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| Self::transport_error(url, &e))?;

        tracing::debug!("Fetched: {} ({}, {} chars)", url, status, body.len());
        Ok(FetchedPage { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_http_client_creation() {
        let client = HttpClient::new(HttpClientConfig::default());
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_zero_rate_limit_is_rejected() {
        let config = HttpClientConfig {
            max_requests_per_second: 0,
            ..Default::default()
        };
        assert!(HttpClient::new(config).is_err());
    }

    #[test]
    fn test_config_from_advanced_settings() {
        let advanced = AdvancedConfig {
            request_timeout_seconds: 3,
            max_requests_per_second: 1,
            ..AdvancedConfig::default()
        };

        let config = HttpClientConfig::from(&advanced);
        assert_eq!(config.timeout_seconds, 3);
        assert_eq!(config.max_requests_per_second, 1);
        assert!(config.follow_redirects);
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let client = HttpClient::new(HttpClientConfig {
            timeout_seconds: 2,
            ..Default::default()
        })
        .unwrap();
        let headers = crate::infrastructure::config::MarketConfig::default().request_headers();

        let result = client.fetch("http://127.0.0.1:9/search", &headers).await;
        assert!(matches!(
            result,
            Err(FetchError::Transport { .. } | FetchError::Timeout { .. })
        ));
    }
}
