//! Company board discovery
//!
//! Four independent strategies feed one funnel:
//!
//! ```text
//! directory scan ─┐
//! probe-by-name  ─┤                  ┌────────┐    ┌──────────┐    ┌─────────────┐
//! keyword search ─┼─▶ BoardLink ────▶│ Ledger │───▶│ register │───▶│ company_urls│
//! recursive crawl─┘  (normalized)    └────────┘    └──────────┘    └─────────────┘
//! ```
//!
//! Strategies run sequentially, sleeping a jittered delay between requests.
//! A failure in one strategy is logged and the run moves on to the next.

pub mod catalog;
pub mod directory;
pub mod ledger;
pub mod probe;
pub mod recursive;
pub mod search;

use anyhow::Result;
use serde::Serialize;

use crate::config::DiscoveryConfig;
use crate::crawler::url::BoardLink;
use crate::crawler::SharedFetcher;
use crate::models::{CompanyBoard, StoreStats};
use crate::storage::SharedStore;

pub use ledger::Ledger;

/// Which strategies a discovery run executes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryPlan {
    pub directory: bool,
    pub probe: bool,
    pub search: bool,
    pub recursive: bool,
    pub industry: bool,
    /// Use the long search-term lists
    pub extended_search: bool,
    /// Explicit recursive seeds; stored boards are used when empty
    pub seeds: Vec<String>,
}

impl DiscoveryPlan {
    pub fn all() -> Self {
        Self {
            directory: true,
            probe: true,
            search: true,
            recursive: true,
            industry: true,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.directory || self.probe || self.search || self.recursive || self.industry)
    }
}

/// Outcome of a discovery run
#[derive(Debug, Clone, Default, Serialize)]
pub struct DiscoveryReport {
    pub directory: usize,
    pub probe: usize,
    pub search: usize,
    pub recursive: usize,
    pub industry: usize,
    pub before: StoreStats,
    pub after: StoreStats,
}

impl DiscoveryReport {
    pub fn new_companies(&self) -> u64 {
        self.after.total.saturating_sub(self.before.total)
    }

    pub fn registered(&self) -> usize {
        self.directory + self.probe + self.search + self.recursive + self.industry
    }
}

/// Discovery engine owning the run-local ledger
pub struct DiscoveryEngine {
    fetcher: SharedFetcher,
    store: SharedStore,
    config: DiscoveryConfig,
    ledger: Ledger,
}

impl DiscoveryEngine {
    pub fn new(fetcher: SharedFetcher, store: SharedStore, config: DiscoveryConfig) -> Self {
        Self {
            fetcher,
            store,
            config,
            ledger: Ledger::new(),
        }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// Funnel a normalized link into the store.
    ///
    /// Returns `true` only when the store created a new row. Store errors are
    /// logged and count as not inserted.
    pub async fn register(&mut self, company_name: &str, link: &BoardLink) -> bool {
        if !self.ledger.mark(&link.canonical_url) {
            tracing::debug!(url = %link.canonical_url, "Already registered this run");
            return false;
        }
        self.ledger.mark_name(company_name);

        let board = CompanyBoard::new(company_name, &link.canonical_url, link.provider);
        match self.store.upsert_board_url(&board).await {
            Ok(true) => {
                tracing::info!(
                    company = %company_name,
                    url = %link.canonical_url,
                    provider = %link.provider,
                    "Added company board"
                );
                true
            }
            Ok(false) => {
                tracing::debug!(url = %link.canonical_url, "Board already stored");
                false
            }
            Err(e) => {
                tracing::error!(url = %link.canonical_url, error = %e, "Failed to store board");
                false
            }
        }
    }

    /// Run the strategies selected by `plan` and report before/after counts
    pub async fn run(&mut self, plan: &DiscoveryPlan) -> Result<DiscoveryReport> {
        let before = self.store.stats().await?;
        tracing::info!(
            total = before.total,
            enabled = before.enabled,
            "Starting company discovery"
        );

        let mut report = DiscoveryReport {
            before,
            ..Default::default()
        };

        if plan.directory {
            report.directory = self.directory_scan().await;
        }
        if plan.probe {
            report.probe = self.probe_by_name(catalog::KNOWN_COMPANIES).await;
        }
        if plan.search {
            report.search = self.provider_search(plan.extended_search).await;
        }
        if plan.recursive {
            let max_depth = self.config.max_depth;
            report.recursive = match self.resolve_seeds(&plan.seeds).await {
                Ok(seeds) => self.recursive_discovery(seeds, max_depth).await,
                Err(e) => {
                    tracing::error!(error = %e, "Could not load recursive seeds");
                    0
                }
            };
        }
        if plan.industry {
            report.industry = self.industry_search(catalog::INDUSTRY_PATTERNS).await;
        }

        report.after = self.store.stats().await?;
        tracing::info!(
            initial_total = report.before.total,
            final_total = report.after.total,
            new_companies = report.new_companies(),
            greenhouse = report.after.greenhouse,
            lever = report.after.lever,
            enabled = report.after.enabled,
            "Company discovery complete"
        );
        Ok(report)
    }

    async fn resolve_seeds(&self, explicit: &[String]) -> Result<Vec<String>> {
        if !explicit.is_empty() {
            return Ok(explicit.to_vec());
        }
        self.store.enabled_urls(Some(self.config.seed_limit)).await
    }
}
