use anyhow::{Context, Result};
use std::sync::Arc;

use boardhound::config::Config;
use boardhound::crawler::{HttpFetcher, SharedFetcher};
use boardhound::harvest::{run_chunk, FailureClassifier};
use boardhound::identity::RunContext;
use boardhound::storage::open_store;

pub struct WorkerParams {
    pub run_hash: String,
    pub started_at: i64,
    pub chunk_index: usize,
    pub chunk_size: usize,
    pub urls: Vec<String>,
}

/// Harvest one chunk and print its report as a JSON line on stdout
pub async fn worker(config: Config, params: WorkerParams) -> Result<()> {
    let run = RunContext::resume(&config.harvest.hashids_salt, params.run_hash, params.started_at);
    let store = open_store(&config)
        .await
        .context("Failed to open company store")?;
    let fetcher: SharedFetcher =
        Arc::new(HttpFetcher::from_config(&config).context("Failed to create fetcher")?);
    let classifier = FailureClassifier::new(config.harvest.transient_threshold);

    let report = run_chunk(
        &run,
        params.chunk_index,
        params.chunk_size.max(1),
        &params.urls,
        fetcher,
        store,
        &classifier,
    )
    .await?;

    println!("{}", serde_json::to_string(&report)?);
    Ok(())
}
