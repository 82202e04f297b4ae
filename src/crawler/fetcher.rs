//! HTTP fetcher with rate limiting and User-Agent rotation
//!
//! This module provides the production [`PageFetcher`] with:
//! - User-Agent rotation
//! - Rate limiting with governor
//! - A per-request timeout
//!
//! It makes exactly one attempt per call. Retrying is a policy decision that
//! belongs to the failure classifier, which defers failed boards to later runs.

use async_trait::async_trait;
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use rand::seq::SliceRandom;
use reqwest::{header::HeaderMap, Client};
use std::num::NonZeroU32;
use std::time::Duration;

use super::headers::{build_browser_headers, origin_referer, USER_AGENTS};
use super::{FetchedPage, PageFetcher};
use crate::config::Config;
use crate::utils::error::FetchError;

/// Rate-limited HTTP fetcher
pub struct HttpFetcher {
    /// HTTP client with configured timeout and compression
    client: Client,

    /// Rate limiter to control request frequency
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
}

impl HttpFetcher {
    /// Create a new fetcher with default timeout
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn new(requests_per_second: u32) -> Result<Self, FetchError> {
        Self::with_config(requests_per_second, Duration::from_secs(30))
    }

    /// Create a fetcher from application configuration
    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        Self::with_config(config.fetcher.rate_limit, config.request_timeout())
    }

    /// Create a new fetcher with custom configuration
    ///
    /// # Arguments
    ///
    /// * `requests_per_second` - Maximum number of requests per second
    /// * `timeout` - Request timeout duration
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn with_config(requests_per_second: u32, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .cookie_store(true)
            .build()?;

        let rate = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = RateLimiter::direct(Quota::per_second(rate));

        Ok(Self {
            client,
            rate_limiter,
        })
    }

    fn build_headers(&self, url: &str) -> HeaderMap {
        build_browser_headers(self.random_user_agent(), origin_referer(url).as_deref())
    }

    /// Get a random user agent from the pool
    fn random_user_agent(&self) -> &'static str {
        let mut rng = rand::thread_rng();
        USER_AGENTS.choose(&mut rng).copied().unwrap_or(USER_AGENTS[0])
    }

    fn validate(url: &str) -> Result<(), FetchError> {
        url::Url::parse(url)
            .map(|_| ())
            .map_err(|e| FetchError::InvalidUrl(format!("{url}: {e}")))
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn get(&self, url: &str) -> Result<FetchedPage, FetchError> {
        Self::validate(url)?;
        self.rate_limiter.until_ready().await;

        let response = self
            .client
            .get(url)
            .headers(self.build_headers(url))
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let body = response.text().await.map_err(FetchError::from_reqwest)?;

        tracing::debug!(url = %url, status, bytes = body.len(), "Fetched page");

        Ok(FetchedPage {
            status,
            body,
            final_url,
        })
    }

    async fn head(&self, url: &str) -> Result<u16, FetchError> {
        Self::validate(url)?;
        self.rate_limiter.until_ready().await;

        let response = self
            .client
            .head(url)
            .headers(self.build_headers(url))
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;

        Ok(response.status().as_u16())
    }
}
