//! Chunking properties, liveness filtering and dispatch routing

mod common;

use async_trait::async_trait;
use proptest::prelude::*;
use std::sync::Mutex;

use boardhound::harvest::distributor::{chunk_urls, dispatch, liveness_filter, Chunk, ChunkLauncher};
use boardhound::harvest::ChunkReport;
use boardhound::utils::error::HarvestError;
use common::{as_fetcher, MockFetcher};

proptest! {
    #[test]
    fn prop_chunks_concatenate_to_input(
        urls in prop::collection::vec("[a-z]{1,8}", 0..60),
        size in 1usize..12,
    ) {
        let chunks = chunk_urls(&urls, size);

        let flattened: Vec<String> = chunks.iter().flatten().cloned().collect();
        prop_assert_eq!(&flattened, &urls);

        prop_assert!(chunks.iter().all(|c| !c.is_empty() && c.len() <= size));
        if let Some((_, init)) = chunks.split_last() {
            prop_assert!(init.iter().all(|c| c.len() == size));
        }
        prop_assert_eq!(chunks.len(), urls.len().div_ceil(size));
    }
}

#[test]
fn test_empty_input_has_no_chunks() {
    for size in 1..5 {
        assert!(chunk_urls(&[], size).is_empty());
    }
}

#[test]
fn test_chunk_plan_numbers_chunks() {
    let urls: Vec<String> = (0..5).map(|i| format!("u{i}")).collect();
    let plan = Chunk::plan(&urls, 2);
    assert_eq!(plan.len(), 3);
    assert_eq!(plan[2].index, 2);
    assert_eq!(plan[2].size, 2);
    assert_eq!(plan[2].urls, vec!["u4".to_string()]);
}

#[tokio::test]
async fn test_liveness_head_then_get() {
    let mock = MockFetcher::new()
        .head("https://jobs.lever.co/head-ok", 200)
        .head("https://jobs.lever.co/redirect", 301)
        .status("https://jobs.lever.co/get-ok", 200)
        .status("https://jobs.lever.co/dead", 404)
        .shared();
    let urls = vec![
        "https://jobs.lever.co/dead".to_string(),
        "https://jobs.lever.co/get-ok".to_string(),
        "https://jobs.lever.co/head-ok".to_string(),
        "https://jobs.lever.co/redirect".to_string(),
    ];

    let alive = liveness_filter(&as_fetcher(&mock), urls).await;

    assert_eq!(
        alive,
        vec![
            "https://jobs.lever.co/get-ok".to_string(),
            "https://jobs.lever.co/head-ok".to_string(),
            "https://jobs.lever.co/redirect".to_string(),
        ]
    );
    // GET only used where HEAD did not confirm
    assert_eq!(mock.hits("https://jobs.lever.co/head-ok"), 0);
    assert_eq!(mock.hits("https://jobs.lever.co/get-ok"), 1);
}

/// Records which chunks it ran and fails the ones listed
#[derive(Default)]
struct RecordingLauncher {
    launched: Mutex<Vec<usize>>,
    fail: Vec<usize>,
}

#[async_trait]
impl ChunkLauncher for RecordingLauncher {
    async fn launch(&self, chunk: &Chunk) -> Result<ChunkReport, HarvestError> {
        self.launched.lock().unwrap().push(chunk.index);
        if self.fail.contains(&chunk.index) {
            return Err(HarvestError::WorkerExit {
                chunk: chunk.index,
                status: "exit status: 1".to_string(),
            });
        }
        Ok(ChunkReport {
            chunk_index: chunk.index,
            boards: chunk.urls.len(),
            ..Default::default()
        })
    }
}

fn urls(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("https://jobs.lever.co/c{i}")).collect()
}

#[tokio::test]
async fn test_single_chunk_runs_locally() {
    let local = RecordingLauncher::default();
    let isolated = RecordingLauncher::default();

    let summary = dispatch(Chunk::plan(&urls(3), 5), &local, &isolated, 4).await;

    assert_eq!(*local.launched.lock().unwrap(), vec![0]);
    assert!(isolated.launched.lock().unwrap().is_empty());
    assert_eq!(summary.totals.boards, 3);
    assert!(summary.is_success());
}

#[tokio::test]
async fn test_many_chunks_run_isolated() {
    let local = RecordingLauncher::default();
    let isolated = RecordingLauncher {
        fail: vec![1],
        ..Default::default()
    };

    let summary = dispatch(Chunk::plan(&urls(5), 2), &local, &isolated, 2).await;

    assert!(local.launched.lock().unwrap().is_empty());
    let mut launched = isolated.launched.lock().unwrap().clone();
    launched.sort();
    assert_eq!(launched, vec![0, 1, 2]);

    assert_eq!(summary.chunks, 3);
    assert_eq!(summary.totals.boards, 3);
    assert!(!summary.is_success());
    assert_eq!(summary.failed_chunks.len(), 1);
    assert_eq!(summary.failed_chunks[0].0, 1);
}
