//! Configuration management for boardhound
//!
//! This module handles loading and validating configuration from environment variables
//! and TOML files. `main` loads a `.env` file with dotenvy before calling
//! [`Config::from_env`].

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default query selecting the boards a harvest run visits
pub const DEFAULT_PAGES_QUERY: &str =
    "SELECT DISTINCT url FROM company_urls WHERE is_enabled = TRUE";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Store configuration
    pub database: DatabaseConfig,

    /// HTTP fetcher configuration
    pub fetcher: FetcherConfig,

    /// Discovery engine configuration
    pub discovery: DiscoveryConfig,

    /// Harvest pipeline configuration
    pub harvest: HarvestConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Store configuration
///
/// PostgreSQL is used when `pg_host` is set, otherwise the SQLite file at
/// `sqlite_path`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub pg_host: Option<String>,
    pub pg_port: u16,
    pub pg_user: Option<String>,
    pub pg_password: Option<String>,
    pub pg_database: Option<String>,

    /// SQLite database path
    pub sqlite_path: PathBuf,

    /// Maximum pool size
    pub pool_size: usize,
}

/// HTTP fetcher configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// Request timeout in seconds
    pub request_timeout_secs: u64,

    /// Rate limit (requests per second)
    pub rate_limit: u32,
}

/// Inclusive jitter range in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl DelayRange {
    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    pub const fn none() -> Self {
        Self::new(0, 0)
    }
}

/// Discovery engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    pub directory_delay: DelayRange,
    pub probe_delay: DelayRange,
    pub search_delay: DelayRange,
    pub industry_delay: DelayRange,
    pub recursive_delay: DelayRange,

    /// Maximum depth of recursive link-following
    pub max_depth: usize,

    /// Number of stored boards used to seed recursive discovery
    pub seed_limit: usize,

    /// Base URL of the web search endpoint
    pub search_url: String,

    /// Result count requested per search query
    pub search_results: usize,
}

/// Harvest pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestConfig {
    /// URLs per worker chunk
    pub chunk_size: usize,

    /// Query returning the board URLs to harvest
    pub pages_query: String,

    /// Salt for record-id hashing
    pub hashids_salt: String,

    /// Filter out unreachable boards before dispatch
    pub check_liveness: bool,

    /// Transient failures tolerated before a board is disabled
    pub transient_threshold: u32,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse::<T>().ok())
}

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let database = DatabaseConfig {
            pg_host: env_nonempty("PG_HOST"),
            pg_port: env_parse("PG_PORT").unwrap_or(defaults.database.pg_port),
            pg_user: env_nonempty("PG_USER"),
            pg_password: env_nonempty("PG_PASSWORD"),
            pg_database: env_nonempty("PG_DATABASE"),
            sqlite_path: env_nonempty("BOARDHOUND_SQLITE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.database.sqlite_path),
            pool_size: env_parse("BOARDHOUND_POOL_SIZE").unwrap_or(defaults.database.pool_size),
        };

        let fetcher = FetcherConfig {
            request_timeout_secs: env_parse("BOARDHOUND_REQUEST_TIMEOUT")
                .unwrap_or(defaults.fetcher.request_timeout_secs),
            rate_limit: env_parse("BOARDHOUND_RATE_LIMIT").unwrap_or(defaults.fetcher.rate_limit),
        };

        let discovery = DiscoveryConfig {
            max_depth: env_parse("BOARDHOUND_MAX_DEPTH").unwrap_or(defaults.discovery.max_depth),
            search_url: env_nonempty("BOARDHOUND_SEARCH_URL")
                .unwrap_or(defaults.discovery.search_url.clone()),
            ..defaults.discovery
        };

        let harvest = HarvestConfig {
            chunk_size: env_parse("CHUNK_SIZE").unwrap_or(defaults.harvest.chunk_size),
            pages_query: env_nonempty("PAGES_TO_SCRAPE_QUERY")
                .unwrap_or(defaults.harvest.pages_query),
            hashids_salt: std::env::var("HASHIDS_SALT").unwrap_or_default(),
            check_liveness: env_parse("BOARDHOUND_CHECK_LIVENESS")
                .unwrap_or(defaults.harvest.check_liveness),
            transient_threshold: defaults.harvest.transient_threshold,
        };

        let logging = LoggingConfig {
            level: env_nonempty("BOARDHOUND_LOG_LEVEL").unwrap_or(defaults.logging.level),
            format: env_nonempty("BOARDHOUND_LOG_FORMAT").unwrap_or(defaults.logging.format),
        };

        Ok(Self {
            database,
            fetcher,
            discovery,
            harvest,
            logging,
        })
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.harvest.chunk_size == 0 {
            anyhow::bail!("chunk_size must be greater than 0");
        }

        if self.fetcher.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be greater than 0");
        }

        if self.fetcher.rate_limit == 0 {
            anyhow::bail!("rate_limit must be positive");
        }

        if self.database.pool_size == 0 {
            anyhow::bail!("pool_size must be greater than 0");
        }

        if self.harvest.transient_threshold == 0 {
            anyhow::bail!("transient_threshold must be greater than 0");
        }

        let d = &self.discovery;
        for (name, range) in [
            ("directory_delay", d.directory_delay),
            ("probe_delay", d.probe_delay),
            ("search_delay", d.search_delay),
            ("industry_delay", d.industry_delay),
            ("recursive_delay", d.recursive_delay),
        ] {
            if range.min_ms > range.max_ms {
                anyhow::bail!("{name}: min_ms must not exceed max_ms");
            }
        }

        if let Some(host) = &self.database.pg_host {
            if host.trim().is_empty() {
                anyhow::bail!("PG_HOST must not be blank");
            }
            if self.database.pg_database.is_none() {
                anyhow::bail!("PG_DATABASE is required when PG_HOST is set");
            }
        }

        Ok(())
    }

    /// Get request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.fetcher.request_timeout_secs)
    }

    /// Whether the PostgreSQL backend is configured
    #[must_use]
    pub fn uses_postgres(&self) -> bool {
        self.database.pg_host.is_some()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                pg_host: None,
                pg_port: 5432,
                pg_user: None,
                pg_password: None,
                pg_database: None,
                sqlite_path: PathBuf::from("data/boardhound.db"),
                pool_size: 10,
            },
            fetcher: FetcherConfig {
                request_timeout_secs: 30,
                rate_limit: 5,
            },
            discovery: DiscoveryConfig {
                directory_delay: DelayRange::new(3_000, 5_000),
                probe_delay: DelayRange::new(500, 1_500),
                search_delay: DelayRange::new(2_000, 5_000),
                industry_delay: DelayRange::new(2_000, 4_000),
                recursive_delay: DelayRange::new(1_000, 2_000),
                max_depth: 2,
                seed_limit: 50,
                search_url: String::from("https://www.google.com/search"),
                search_results: 100,
            },
            harvest: HarvestConfig {
                chunk_size: 1,
                pages_query: String::from(DEFAULT_PAGES_QUERY),
                hashids_salt: String::new(),
                check_liveness: false,
                transient_threshold: 3,
            },
            logging: LoggingConfig {
                level: String::from("info"),
                format: String::from("text"),
            },
        }
    }
}
