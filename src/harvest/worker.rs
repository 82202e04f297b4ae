//! One chunk of board URLs, harvested by one worker
//!
//! Spiders run concurrently on the current runtime and push items into a
//! bounded channel. A single storage task drains the channel, so the store
//! sees one writer per worker.

use anyhow::{Context, Result};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use super::classifier::{FailureClassifier, Verdict};
use super::spider::{Spider, SpiderOutcome};
use crate::crawler::SharedFetcher;
use crate::identity::RunContext;
use crate::models::HarvestItem;
use crate::storage::SharedStore;

/// Capacity of the spider-to-storage channel
const ITEM_BUFFER: usize = 1_000;

/// Totals for one chunk, also the wire format a worker process prints
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkReport {
    pub chunk_index: usize,
    pub boards: usize,
    /// URLs no parser recognizes
    pub unsupported: usize,
    pub pages: u32,
    pub items: usize,
    pub stored: usize,
    /// Items whose id already existed
    pub duplicates: usize,
    pub store_errors: usize,
    pub skipped_elements: usize,
    pub failed_boards: usize,
    pub disabled_boards: usize,
}

impl ChunkReport {
    fn absorb(&mut self, outcome: &SpiderOutcome) {
        self.pages += outcome.pages;
        self.items += outcome.items;
        self.skipped_elements += outcome.skipped;
        if outcome.failure.is_some() {
            self.failed_boards += 1;
        }
    }

    /// Fold another chunk's totals into this one
    pub fn merge(&mut self, other: &ChunkReport) {
        self.boards += other.boards;
        self.unsupported += other.unsupported;
        self.pages += other.pages;
        self.items += other.items;
        self.stored += other.stored;
        self.duplicates += other.duplicates;
        self.store_errors += other.store_errors;
        self.skipped_elements += other.skipped_elements;
        self.failed_boards += other.failed_boards;
        self.disabled_boards += other.disabled_boards;
    }
}

#[derive(Debug, Default)]
struct StoreTally {
    stored: usize,
    duplicates: usize,
    errors: usize,
}

async fn store_items(store: SharedStore, mut rx: mpsc::Receiver<HarvestItem>) -> StoreTally {
    let mut tally = StoreTally::default();
    while let Some(item) = rx.recv().await {
        match store.insert_item(&item).await {
            Ok(true) => tally.stored += 1,
            Ok(false) => tally.duplicates += 1,
            Err(e) => {
                tally.errors += 1;
                tracing::error!(id = %item.id(), error = %e, "Failed to store item");
            }
        }
    }
    tally
}

/// Harvest every URL of a chunk.
///
/// `url_id` of the URL at position `i` is `chunk_index * chunk_size + i`, so
/// ids stay unique across workers of the same run.
pub async fn run_chunk(
    run: &RunContext,
    chunk_index: usize,
    chunk_size: usize,
    urls: &[String],
    fetcher: SharedFetcher,
    store: SharedStore,
    classifier: &FailureClassifier,
) -> Result<ChunkReport> {
    tracing::info!(
        chunk = chunk_index,
        boards = urls.len(),
        run_hash = %run.run_hash(),
        "Harvesting chunk"
    );

    let mut report = ChunkReport {
        chunk_index,
        boards: urls.len(),
        ..Default::default()
    };

    let (tx, rx) = mpsc::channel(ITEM_BUFFER);
    let consumer = tokio::spawn(store_items(store.clone(), rx));

    let base = (chunk_index * chunk_size) as u64;
    let mut spiders = Vec::with_capacity(urls.len());
    for (i, url) in urls.iter().enumerate() {
        match Spider::new(run, url, base + i as u64, fetcher.clone()) {
            Ok(spider) => spiders.push(spider.run(tx.clone())),
            Err(e) => {
                report.unsupported += 1;
                tracing::warn!(url = %url, error = %e, "Skipping unsupported board");
            }
        }
    }
    drop(tx);

    let outcomes = join_all(spiders).await;

    for outcome in &outcomes {
        report.absorb(outcome);
        if let Some(kind) = outcome.failure {
            if classifier.handle(store.as_ref(), &outcome.url, kind).await == Verdict::Disable {
                report.disabled_boards += 1;
            }
        }
    }

    let tally = consumer.await.context("Storage task panicked")?;
    report.stored = tally.stored;
    report.duplicates = tally.duplicates;
    report.store_errors = tally.errors;

    tracing::info!(
        chunk = chunk_index,
        pages = report.pages,
        stored = report.stored,
        duplicates = report.duplicates,
        failed = report.failed_boards,
        disabled = report.disabled_boards,
        "Chunk complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_merge() {
        let mut total = ChunkReport::default();
        let a = ChunkReport {
            chunk_index: 0,
            boards: 2,
            stored: 5,
            failed_boards: 1,
            ..Default::default()
        };
        let b = ChunkReport {
            chunk_index: 1,
            boards: 3,
            stored: 7,
            disabled_boards: 1,
            ..Default::default()
        };
        total.merge(&a);
        total.merge(&b);
        assert_eq!(total.boards, 5);
        assert_eq!(total.stored, 12);
        assert_eq!(total.failed_boards, 1);
        assert_eq!(total.disabled_boards, 1);
    }

    #[test]
    fn test_report_json_round_trip() {
        let report = ChunkReport {
            chunk_index: 4,
            items: 9,
            ..Default::default()
        };
        let json = serde_json::to_string(&report).unwrap();
        assert_eq!(serde_json::from_str::<ChunkReport>(&json).unwrap(), report);
    }
}
