//! Outbound HTTP with rate limiting and politeness
//!
//! Discovery and harvest code talk to the network only through the
//! [`PageFetcher`] trait so tests can substitute canned responses.

pub mod delay;
pub mod fetcher;
pub mod headers;
pub mod url;

use async_trait::async_trait;
use std::sync::Arc;

use crate::utils::error::FetchError;

pub use delay::JitterDelay;
pub use fetcher::HttpFetcher;

/// A fetched page, whatever its status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub status: u16,
    pub body: String,
    /// URL after redirects
    pub final_url: String,
}

impl FetchedPage {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport seam for everything that touches the network
///
/// `get` returns `Ok` for any HTTP response, including 4xx/5xx. `Err` means
/// no response was received at all.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn get(&self, url: &str) -> Result<FetchedPage, FetchError>;

    async fn head(&self, url: &str) -> Result<u16, FetchError>;
}

/// Thread-safe shared fetcher
pub type SharedFetcher = Arc<dyn PageFetcher>;
