//! Common test utilities

#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use boardhound::config::{Config, DelayRange, DiscoveryConfig};
use boardhound::crawler::{FetchedPage, PageFetcher, SharedFetcher};
use boardhound::models::{CompanyBoard, HarvestItem, Provider};
use boardhound::storage::{BoardStore, CountPredicate, SharedStore, SqliteStore};
use boardhound::utils::error::FetchError;

/// Read an HTML fixture from `tests/fixtures/html`
pub fn fixture(name: &str) -> String {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/html")
        .join(name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("fixture {}: {e}", path.display()))
}

/// Canned outcome for one URL
#[derive(Debug, Clone)]
pub enum Canned {
    Page(u16, String),
    Timeout,
    Connect,
}

/// Fetcher answering from a URL table; unknown URLs get an empty 404
#[derive(Debug, Default)]
pub struct MockFetcher {
    routes: Mutex<HashMap<String, Canned>>,
    heads: Mutex<HashMap<String, u16>>,
    requests: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(self, url: &str, body: impl Into<String>) -> Self {
        self.respond(url, Canned::Page(200, body.into()))
    }

    pub fn status(self, url: &str, status: u16) -> Self {
        self.respond(url, Canned::Page(status, String::new()))
    }

    pub fn respond(self, url: &str, canned: Canned) -> Self {
        self.routes.lock().unwrap().insert(url.to_string(), canned);
        self
    }

    pub fn head(self, url: &str, status: u16) -> Self {
        self.heads.lock().unwrap().insert(url.to_string(), status);
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Every GET issued, in order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn hits(&self, url: &str) -> usize {
        self.requests.lock().unwrap().iter().filter(|u| *u == url).count()
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn get(&self, url: &str) -> Result<FetchedPage, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());
        let canned = self.routes.lock().unwrap().get(url).cloned();
        match canned.unwrap_or(Canned::Page(404, String::new())) {
            Canned::Page(status, body) => Ok(FetchedPage {
                status,
                body,
                final_url: url.to_string(),
            }),
            Canned::Timeout => Err(FetchError::Timeout),
            Canned::Connect => Err(FetchError::Connect("connection refused".to_string())),
        }
    }

    async fn head(&self, url: &str) -> Result<u16, FetchError> {
        Ok(self.heads.lock().unwrap().get(url).copied().unwrap_or(405))
    }
}

pub fn as_fetcher(mock: &Arc<MockFetcher>) -> SharedFetcher {
    mock.clone()
}

/// SQLite store that also remembers every inserted item
pub struct RecordingStore {
    inner: SqliteStore,
    items: Mutex<Vec<HarvestItem>>,
}

impl RecordingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: SqliteStore::in_memory().unwrap(),
            items: Mutex::new(Vec::new()),
        })
    }

    pub fn items(&self) -> Vec<HarvestItem> {
        self.items.lock().unwrap().clone()
    }

    pub async fn add(&self, slug: &str, provider: Provider) -> String {
        let url = provider.board_url(slug);
        self.upsert_board_url(&CompanyBoard::new(slug, &url, provider))
            .await
            .unwrap();
        url
    }
}

#[async_trait]
impl BoardStore for RecordingStore {
    async fn upsert_board_url(&self, board: &CompanyBoard) -> Result<bool> {
        self.inner.upsert_board_url(board).await
    }

    async fn set_enabled(&self, url: &str, enabled: bool) -> Result<bool> {
        self.inner.set_enabled(url, enabled).await
    }

    async fn is_enabled(&self, url: &str) -> Result<Option<bool>> {
        self.inner.is_enabled(url).await
    }

    async fn enabled_urls(&self, limit: Option<usize>) -> Result<Vec<String>> {
        self.inner.enabled_urls(limit).await
    }

    async fn query_urls(&self, sql: &str) -> Result<Vec<String>> {
        self.inner.query_urls(sql).await
    }

    async fn count_where(&self, predicate: CountPredicate) -> Result<u64> {
        self.inner.count_where(predicate).await
    }

    async fn insert_item(&self, item: &HarvestItem) -> Result<bool> {
        let inserted = self.inner.insert_item(item).await?;
        if inserted {
            self.items.lock().unwrap().push(item.clone());
        }
        Ok(inserted)
    }
}

pub fn as_store(store: &Arc<RecordingStore>) -> SharedStore {
    store.clone()
}

/// Discovery settings with every delay switched off
pub fn fast_discovery() -> DiscoveryConfig {
    let none = DelayRange::none();
    DiscoveryConfig {
        directory_delay: none,
        probe_delay: none,
        search_delay: none,
        industry_delay: none,
        recursive_delay: none,
        search_url: "https://search.test/search".to_string(),
        ..Config::default().discovery
    }
}
