//! boardhound - Greenhouse and Lever job-board discovery and harvesting
//!
//! Finds companies hosting job boards on the Greenhouse or Lever applicant
//! tracking platforms, then harvests their departments and openings into a
//! relational store.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Environment and file configuration
//! - [`crawler`] - Rate-limited fetching, politeness delays, URL canonicalization
//! - [`discovery`] - Directory scan, name probing, search and recursive discovery
//! - [`parser`] - Board HTML dialects (legacy Greenhouse, new-format Greenhouse, Lever)
//! - [`harvest`] - Spider state machine, failure classification, work distribution
//! - [`identity`] - Deterministic record ids and per-run context
//! - [`models`] - Core data structures and types
//! - [`storage`] - Database operations (SQLite, PostgreSQL)
//! - [`utils`] - Common utilities and error types
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use boardhound::config::Config;
//! use boardhound::crawler::HttpFetcher;
//! use boardhound::discovery::{DiscoveryEngine, DiscoveryPlan};
//! use boardhound::storage::open_store;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let store = open_store(&config).await?;
//!     let fetcher = Arc::new(HttpFetcher::from_config(&config)?);
//!     let mut engine = DiscoveryEngine::new(fetcher, store, config.discovery.clone());
//!     let report = engine.run(&DiscoveryPlan::all()).await?;
//!     println!("{} new companies", report.new_companies());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod crawler;
pub mod discovery;
pub mod harvest;
pub mod identity;
pub mod models;
pub mod parser;
pub mod storage;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::crawler::{HttpFetcher, PageFetcher, SharedFetcher};
    pub use crate::discovery::{DiscoveryEngine, DiscoveryPlan, DiscoveryReport};
    pub use crate::harvest::{ChunkReport, FailureClassifier, FailureKind, HarvestSummary};
    pub use crate::identity::RunContext;
    pub use crate::models::{CompanyBoard, HarvestItem, Provider, StoreStats};
    pub use crate::parser::BoardParser;
    pub use crate::storage::{BoardStore, SharedStore};
    pub use crate::utils::error::{FetchError, HarvestError, ParseError};
}

// Direct re-exports for convenience
pub use models::{CompanyBoard, HarvestItem, Provider};
