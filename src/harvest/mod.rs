//! Job listing harvest
//!
//! The harvest reads board URLs from the store, splits them into chunks, and
//! runs one [`spider::Spider`] per URL inside a worker per chunk. Every record
//! is stamped with the run's [`RunContext`](crate::identity::RunContext).
//!
//! Fetch failures on a board's first page feed the
//! [`classifier::FailureClassifier`], which may switch the board off.

pub mod classifier;
pub mod distributor;
pub mod spider;
pub mod worker;

use anyhow::{Context, Result};

use crate::storage::BoardStore;

pub use classifier::{FailureClassifier, FailureKind, Verdict};
pub use distributor::{
    chunk_urls, dispatch, liveness_filter, Chunk, ChunkLauncher, HarvestSummary,
    InProcessLauncher, ProcessLauncher,
};
pub use spider::{Spider, SpiderOutcome};
pub use worker::{run_chunk, ChunkReport};

/// Board URLs selected by the configured query, deduplicated in order
pub async fn load_board_urls(store: &dyn BoardStore, pages_query: &str) -> Result<Vec<String>> {
    let urls = store
        .query_urls(pages_query)
        .await
        .with_context(|| format!("Failed to load board URLs with: {pages_query}"))?;

    let mut seen = std::collections::HashSet::new();
    Ok(urls
        .into_iter()
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty() && seen.insert(url.clone()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_PAGES_QUERY;
    use crate::models::{CompanyBoard, Provider};
    use crate::storage::SqliteStore;

    #[tokio::test]
    async fn test_load_board_urls_enabled_only() {
        let store = SqliteStore::in_memory().unwrap();
        for slug in ["acme", "beta"] {
            store
                .upsert_board_url(&CompanyBoard::new(slug, Provider::Lever.board_url(slug), Provider::Lever))
                .await
                .unwrap();
        }
        store.set_enabled("https://jobs.lever.co/beta", false).await.unwrap();

        let urls = load_board_urls(&store, DEFAULT_PAGES_QUERY).await.unwrap();
        assert_eq!(urls, vec!["https://jobs.lever.co/acme".to_string()]);
    }
}
