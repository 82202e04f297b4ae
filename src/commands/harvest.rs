use anyhow::{Context, Result};
use std::sync::Arc;

use boardhound::config::Config;
use boardhound::crawler::{HttpFetcher, SharedFetcher};
use boardhound::harvest::distributor::available_workers;
use boardhound::harvest::{
    dispatch, liveness_filter, load_board_urls, Chunk, FailureClassifier, HarvestSummary,
    InProcessLauncher, ProcessLauncher,
};
use boardhound::identity::RunContext;
use boardhound::storage::{open_store, BoardStore};

pub struct HarvestParams {
    /// Worker process limit, CPU count when `None`
    pub workers: Option<usize>,
    /// Global flags handed to each worker process
    pub worker_args: Vec<String>,
}

pub async fn harvest(config: Config, params: HarvestParams) -> Result<()> {
    let store = open_store(&config)
        .await
        .context("Failed to open company store")?;
    store.seed_defaults_if_empty().await?;

    let mut urls = load_board_urls(store.as_ref(), &config.harvest.pages_query).await?;
    if urls.is_empty() {
        tracing::warn!("No enabled boards to harvest");
        return Ok(());
    }

    let fetcher: SharedFetcher =
        Arc::new(HttpFetcher::from_config(&config).context("Failed to create fetcher")?);

    if config.harvest.check_liveness {
        urls = liveness_filter(&fetcher, urls).await;
        if urls.is_empty() {
            tracing::warn!("No boards passed the liveness check");
            return Ok(());
        }
    }

    let run = RunContext::new(&config.harvest.hashids_salt);
    let chunks = Chunk::plan(&urls, config.harvest.chunk_size);
    tracing::info!(
        run_hash = %run.run_hash(),
        boards = urls.len(),
        chunks = chunks.len(),
        "Starting harvest run"
    );

    let classifier = Arc::new(FailureClassifier::new(config.harvest.transient_threshold));
    let local = InProcessLauncher::new(run.clone(), fetcher, store, classifier);
    let isolated = ProcessLauncher::current_exe(&run)
        .context("Failed to locate boardhound executable")?
        .with_global_args(params.worker_args);
    let parallelism = params.workers.unwrap_or_else(available_workers);

    let summary = dispatch(chunks, &local, &isolated, parallelism).await;
    print_summary(&run, &summary);

    if !summary.is_success() {
        anyhow::bail!(
            "{} of {} chunks failed",
            summary.failed_chunks.len(),
            summary.chunks
        );
    }
    Ok(())
}

fn print_summary(run: &RunContext, summary: &HarvestSummary) {
    let totals = &summary.totals;
    println!("Harvest Summary");
    println!("===============");
    println!("  Run hash:          {}", run.run_hash());
    println!("  Chunks:            {}", summary.chunks);
    println!("  Boards:            {}", totals.boards);
    println!("  Pages fetched:     {}", totals.pages);
    println!("  Items stored:      {}", totals.stored);
    println!("  Duplicate items:   {}", totals.duplicates);
    println!("  Skipped elements:  {}", totals.skipped_elements);
    println!("  Failed boards:     {}", totals.failed_boards);
    println!("  Disabled boards:   {}", totals.disabled_boards);
    for (chunk, error) in &summary.failed_chunks {
        println!("  Chunk {chunk} failed: {error}");
    }
}
