//! Chunking and dispatch of board URLs to workers
//!
//! ```text
//!  enabled URLs ─▶ liveness filter ─▶ chunk_urls(n) ─┬─ 1 chunk ──▶ in-process worker
//!    (store)        (optional)                       └─ N chunks ─▶ worker processes
//!                                                                   (bounded by CPUs)
//! ```
//!
//! Workers share nothing but the store. A worker process prints its
//! [`ChunkReport`] as one JSON line on stdout; logs go to stderr.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;

use super::classifier::FailureClassifier;
use super::worker::{run_chunk, ChunkReport};
use crate::crawler::SharedFetcher;
use crate::identity::RunContext;
use crate::storage::SharedStore;
use crate::utils::error::HarvestError;

/// Concurrent liveness checks
const LIVENESS_CONCURRENCY: usize = 16;

/// Split `urls` into order-preserving chunks of at most `size` (minimum 1)
pub fn chunk_urls(urls: &[String], size: usize) -> Vec<Vec<String>> {
    urls.chunks(size.max(1)).map(<[String]>::to_vec).collect()
}

/// 2xx and 3xx count as alive
pub fn is_alive(status: u16) -> bool {
    (200..400).contains(&status)
}

/// Keep URLs that answer HEAD, or GET when HEAD fails, with 2xx/3xx.
/// Input order is preserved.
pub async fn liveness_filter(fetcher: &SharedFetcher, urls: Vec<String>) -> Vec<String> {
    let total = urls.len();
    let alive: Vec<String> = stream::iter(urls)
        .map(|url| {
            let fetcher = fetcher.clone();
            async move {
                let status = match fetcher.head(&url).await {
                    Ok(status) if is_alive(status) => Some(status),
                    _ => fetcher.get(&url).await.ok().map(|page| page.status),
                };
                match status {
                    Some(status) if is_alive(status) => Some(url),
                    other => {
                        tracing::info!(url = %url, status = ?other, "Board failed liveness check");
                        None
                    }
                }
            }
        })
        .buffered(LIVENESS_CONCURRENCY)
        .filter_map(|url| async move { url })
        .collect()
        .await;

    tracing::info!(total, alive = alive.len(), "Liveness check complete");
    alive
}

/// One unit of dispatched work
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub index: usize,
    /// Configured chunk size, used for `url_id` offsets
    pub size: usize,
    pub urls: Vec<String>,
}

impl Chunk {
    /// Number the chunks produced by [`chunk_urls`]
    pub fn plan(urls: &[String], size: usize) -> Vec<Chunk> {
        let size = size.max(1);
        chunk_urls(urls, size)
            .into_iter()
            .enumerate()
            .map(|(index, urls)| Chunk { index, size, urls })
            .collect()
    }
}

/// Runs one chunk somewhere
#[async_trait]
pub trait ChunkLauncher: Send + Sync {
    async fn launch(&self, chunk: &Chunk) -> Result<ChunkReport, HarvestError>;
}

/// Runs chunks on the current runtime
pub struct InProcessLauncher {
    run: RunContext,
    fetcher: SharedFetcher,
    store: SharedStore,
    classifier: Arc<FailureClassifier>,
}

impl InProcessLauncher {
    pub fn new(
        run: RunContext,
        fetcher: SharedFetcher,
        store: SharedStore,
        classifier: Arc<FailureClassifier>,
    ) -> Self {
        Self {
            run,
            fetcher,
            store,
            classifier,
        }
    }
}

#[async_trait]
impl ChunkLauncher for InProcessLauncher {
    async fn launch(&self, chunk: &Chunk) -> Result<ChunkReport, HarvestError> {
        run_chunk(
            &self.run,
            chunk.index,
            chunk.size,
            &chunk.urls,
            self.fetcher.clone(),
            self.store.clone(),
            &self.classifier,
        )
        .await
        .map_err(|e| HarvestError::WorkerExit {
            chunk: chunk.index,
            status: format!("{e:#}"),
        })
    }
}

/// Re-invokes an executable's `worker` subcommand, one process per chunk
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    program: PathBuf,
    /// Arguments placed before the subcommand, e.g. `--config <path>`
    global_args: Vec<String>,
    run_hash: String,
    started_at: i64,
}

impl ProcessLauncher {
    pub fn new(program: impl Into<PathBuf>, run: &RunContext) -> Self {
        Self {
            program: program.into(),
            global_args: Vec::new(),
            run_hash: run.run_hash().to_string(),
            started_at: run.started_at(),
        }
    }

    /// Launcher for the running executable
    pub fn current_exe(run: &RunContext) -> std::io::Result<Self> {
        Ok(Self::new(std::env::current_exe()?, run))
    }

    pub fn with_global_args(mut self, args: Vec<String>) -> Self {
        self.global_args = args;
        self
    }

    /// Full argument list for a chunk
    pub fn args(&self, chunk: &Chunk) -> Vec<String> {
        let mut args = self.global_args.clone();
        args.extend([
            "worker".to_string(),
            "--run-hash".to_string(),
            self.run_hash.clone(),
            "--started-at".to_string(),
            self.started_at.to_string(),
            "--chunk-index".to_string(),
            chunk.index.to_string(),
            "--chunk-size".to_string(),
            chunk.size.to_string(),
            "--".to_string(),
        ]);
        args.extend(chunk.urls.iter().cloned());
        args
    }
}

#[async_trait]
impl ChunkLauncher for ProcessLauncher {
    async fn launch(&self, chunk: &Chunk) -> Result<ChunkReport, HarvestError> {
        tracing::debug!(chunk = chunk.index, program = %self.program.display(), "Spawning worker");
        let output = tokio::process::Command::new(&self.program)
            .args(self.args(chunk))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| HarvestError::Launch {
                chunk: chunk.index,
                source,
            })?;

        if !output.status.success() {
            return Err(HarvestError::WorkerExit {
                chunk: chunk.index,
                status: output.status.to_string(),
            });
        }

        parse_report(chunk.index, &output.stdout)
    }
}

/// Read the last non-empty stdout line as a report
fn parse_report(chunk: usize, stdout: &[u8]) -> Result<ChunkReport, HarvestError> {
    let text = String::from_utf8_lossy(stdout);
    let line = text
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .unwrap_or_default();
    serde_json::from_str(line).map_err(|source| HarvestError::Report { chunk, source })
}

/// Result of dispatching every chunk of a run
#[derive(Debug, Default, Serialize)]
pub struct HarvestSummary {
    pub chunks: usize,
    pub totals: ChunkReport,
    /// `(chunk index, error)` for chunks that did not finish
    pub failed_chunks: Vec<(usize, String)>,
}

impl HarvestSummary {
    pub fn is_success(&self) -> bool {
        self.failed_chunks.is_empty()
    }

    fn record(&mut self, index: usize, result: Result<ChunkReport, HarvestError>) {
        match result {
            Ok(report) => self.totals.merge(&report),
            Err(e) => {
                tracing::error!(chunk = index, error = %e, "Chunk failed");
                self.failed_chunks.push((index, e.to_string()));
            }
        }
    }
}

/// Default worker parallelism
pub fn available_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

/// Run every chunk. A lone chunk runs on `local`; otherwise chunks go to
/// `isolated`, at most `parallelism` at a time.
pub async fn dispatch(
    chunks: Vec<Chunk>,
    local: &dyn ChunkLauncher,
    isolated: &dyn ChunkLauncher,
    parallelism: usize,
) -> HarvestSummary {
    let mut summary = HarvestSummary {
        chunks: chunks.len(),
        ..Default::default()
    };

    if let [only] = chunks.as_slice() {
        tracing::info!(boards = only.urls.len(), "Running single chunk in process");
        summary.record(only.index, local.launch(only).await);
        return summary;
    }

    tracing::info!(chunks = chunks.len(), parallelism, "Dispatching chunks to workers");
    let results: Vec<(usize, Result<ChunkReport, HarvestError>)> = stream::iter(&chunks)
        .map(|chunk| async move { (chunk.index, isolated.launch(chunk).await) })
        .buffer_unordered(parallelism.max(1))
        .collect()
        .await;

    for (index, result) in results {
        summary.record(index, result);
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("https://jobs.lever.co/c{i}")).collect()
    }

    #[test]
    fn test_chunk_urls_remainder() {
        let chunks = chunk_urls(&urls(5), 2);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[2], vec!["https://jobs.lever.co/c4".to_string()]);
        assert!(chunk_urls(&[], 3).is_empty());
        assert_eq!(chunk_urls(&urls(3), 0).len(), 3);
    }

    #[test]
    fn test_is_alive() {
        assert!(is_alive(200));
        assert!(is_alive(301));
        assert!(!is_alive(404));
        assert!(!is_alive(503));
    }

    #[test]
    fn test_worker_args() {
        let run = RunContext::at("salt", 1_700_000_000);
        let launcher = ProcessLauncher::new("/usr/bin/boardhound", &run)
            .with_global_args(vec!["--log-format".into(), "json".into()]);
        let chunk = Chunk {
            index: 2,
            size: 3,
            urls: urls(2),
        };
        let args = launcher.args(&chunk);
        assert_eq!(&args[..3], ["--log-format", "json", "worker"]);
        assert!(args.windows(2).any(|w| w == ["--run-hash", run.run_hash()]));
        assert!(args.windows(2).any(|w| w == ["--started-at", "1700000000"]));
        assert!(args.windows(2).any(|w| w == ["--chunk-index", "2"]));
        assert_eq!(args.last().map(String::as_str), Some("https://jobs.lever.co/c1"));
    }

    #[test]
    fn test_parse_report_takes_last_line() {
        let stdout = b"noise\n{\"chunk_index\":1,\"boards\":2,\"unsupported\":0,\"pages\":3,\"items\":4,\"stored\":4,\"duplicates\":0,\"store_errors\":0,\"skipped_elements\":0,\"failed_boards\":0,\"disabled_boards\":0}\n\n";
        let report = parse_report(1, stdout).unwrap();
        assert_eq!(report.pages, 3);
        assert!(matches!(
            parse_report(7, b"not json"),
            Err(HarvestError::Report { chunk: 7, .. })
        ));
    }
}
