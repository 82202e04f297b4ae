//! Persistence for company boards and harvested listings
//!
//! Business logic depends on the [`BoardStore`] trait only:
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │      discovery engine / harvest workers      │
//! └──────────────────────────────────────────────┘
//!                        │
//!                        ▼
//! ┌──────────────────────────────────────────────┐
//! │                 BoardStore                   │
//! └──────────────────────────────────────────────┘
//!              │                     │
//!              ▼                     ▼
//!     ┌─────────────────┐   ┌─────────────────┐
//!     │   PostgreSQL    │   │     SQLite      │
//!     │ (PG_HOST set)   │   │  (local runs)   │
//!     └─────────────────┘   └─────────────────┘
//! ```
//!
//! The store is the authority on URL uniqueness. Inserts never overwrite and
//! rows are never deleted; boards are only switched off via `is_enabled`.

pub mod postgres;
pub mod sqlite;

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use crate::config::Config;
use crate::models::{CompanyBoard, HarvestItem, Provider, StoreStats};

pub use postgres::PostgresStore;
pub use sqlite::SqliteStore;

/// Boards seeded into an empty store so a first harvest has work
pub const DEFAULT_SEED_BOARDS: &[(&str, &str)] = &[
    ("netflix", "https://boards.greenhouse.io/netflix"),
    ("spotify", "https://boards.greenhouse.io/spotify"),
    ("airbnb", "https://boards.greenhouse.io/airbnb"),
    ("doordash", "https://boards.greenhouse.io/doordash"),
    ("stripe", "https://boards.greenhouse.io/stripe"),
];

/// Filter for [`BoardStore::count_where`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountPredicate {
    All,
    Enabled,
    Provider(Provider),
}

/// Company and listings store
#[async_trait]
pub trait BoardStore: Send + Sync {
    /// Insert a board if its URL is new. Returns `true` only when a row was created.
    async fn upsert_board_url(&self, board: &CompanyBoard) -> Result<bool>;

    /// Flip `is_enabled` for a URL. Returns `false` when no row matched.
    async fn set_enabled(&self, url: &str, enabled: bool) -> Result<bool>;

    /// Current `is_enabled` flag, `None` if the URL is unknown
    async fn is_enabled(&self, url: &str) -> Result<Option<bool>>;

    /// Enabled board URLs in insertion order
    async fn enabled_urls(&self, limit: Option<usize>) -> Result<Vec<String>>;

    /// Run a caller-supplied query whose first column is a URL
    async fn query_urls(&self, sql: &str) -> Result<Vec<String>>;

    async fn count_where(&self, predicate: CountPredicate) -> Result<u64>;

    /// Persist a harvested record. Returns `false` if its id already exists.
    async fn insert_item(&self, item: &HarvestItem) -> Result<bool>;

    async fn stats(&self) -> Result<StoreStats> {
        Ok(StoreStats {
            total: self.count_where(CountPredicate::All).await?,
            enabled: self.count_where(CountPredicate::Enabled).await?,
            greenhouse: self
                .count_where(CountPredicate::Provider(Provider::Greenhouse))
                .await?,
            lever: self
                .count_where(CountPredicate::Provider(Provider::Lever))
                .await?,
        })
    }

    /// Seed [`DEFAULT_SEED_BOARDS`] when `company_urls` is empty
    async fn seed_defaults_if_empty(&self) -> Result<usize> {
        if self.count_where(CountPredicate::All).await? > 0 {
            return Ok(0);
        }

        let mut seeded = 0;
        for (name, url) in DEFAULT_SEED_BOARDS {
            let board = CompanyBoard::new(*name, *url, Provider::Greenhouse);
            if self.upsert_board_url(&board).await? {
                seeded += 1;
            }
        }
        tracing::info!(seeded, "Seeded empty store with default boards");
        Ok(seeded)
    }
}

/// Thread-safe shared store
pub type SharedStore = Arc<dyn BoardStore>;

/// Open the configured backend and make sure its schema exists
pub async fn open_store(config: &Config) -> Result<SharedStore> {
    if config.uses_postgres() {
        let store = PostgresStore::connect(&config.database).await?;
        Ok(Arc::new(store))
    } else {
        let store = SqliteStore::new(&config.database.sqlite_path)?;
        Ok(Arc::new(store))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seed_defaults_only_when_empty() {
        let store = SqliteStore::in_memory().unwrap();
        assert_eq!(store.seed_defaults_if_empty().await.unwrap(), DEFAULT_SEED_BOARDS.len());
        assert_eq!(store.seed_defaults_if_empty().await.unwrap(), 0);

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.total, DEFAULT_SEED_BOARDS.len() as u64);
        assert_eq!(stats.greenhouse, stats.total);
        assert_eq!(stats.lever, 0);
    }

    #[tokio::test]
    async fn test_open_store_defaults_to_sqlite() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.database.sqlite_path = dir.path().join("nested").join("boards.db");

        let store = open_store(&config).await.unwrap();
        assert_eq!(store.count_where(CountPredicate::All).await.unwrap(), 0);
        assert!(config.database.sqlite_path.exists());
    }
}
