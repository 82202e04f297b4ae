use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use boardhound::config::Config;
use boardhound::discovery::DiscoveryPlan;

mod commands;

#[derive(Parser)]
#[command(
    name = "boardhound",
    version,
    about = "Discover Greenhouse and Lever job boards and harvest their listings",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json); defaults to BOARDHOUND_LOG_FORMAT
    #[arg(long, global = true)]
    log_format: Option<String>,

    /// TOML config file; environment variables are used when absent
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Find new company job boards
    Discover(DiscoverFlags),

    /// Harvest departments and openings from enabled boards
    Harvest {
        /// URLs per worker (overrides CHUNK_SIZE)
        #[arg(long)]
        chunk_size: Option<usize>,

        /// Drop boards that fail a HEAD/GET liveness check first
        #[arg(long, default_value = "false")]
        check_liveness: bool,

        /// Maximum concurrent worker processes
        #[arg(long)]
        workers: Option<usize>,
    },

    /// Show company board counts
    Stats {
        /// Print as JSON
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Harvest one chunk (spawned by `harvest`)
    #[command(hide = true)]
    Worker {
        #[arg(long)]
        run_hash: String,

        #[arg(long)]
        started_at: i64,

        #[arg(long)]
        chunk_index: usize,

        #[arg(long)]
        chunk_size: usize,

        /// Board URLs of the chunk
        urls: Vec<String>,
    },
}

#[derive(Args)]
struct DiscoverFlags {
    /// Run every strategy (default when no strategy flag is given)
    #[arg(long)]
    all: bool,

    /// Scan the Greenhouse company directory
    #[arg(long)]
    greenhouse: bool,

    /// Probe Lever boards for known company names
    #[arg(long)]
    lever: bool,

    /// Search for boards with curated terms
    #[arg(long)]
    search: bool,

    /// Use the long search-term lists
    #[arg(long)]
    extended_search: bool,

    /// Follow hiring links from known boards
    #[arg(long)]
    recursive: bool,

    /// Search industry keywords
    #[arg(long)]
    industry: bool,

    /// Recursive discovery depth (overrides BOARDHOUND_MAX_DEPTH)
    #[arg(long)]
    max_depth: Option<usize>,

    /// Recursive seed URL; stored boards are used when none is given
    #[arg(long = "seed")]
    seeds: Vec<String>,
}

impl DiscoverFlags {
    fn plan(&self) -> DiscoveryPlan {
        let selected = DiscoveryPlan {
            directory: self.greenhouse,
            probe: self.lever,
            search: self.search || self.extended_search,
            recursive: self.recursive,
            industry: self.industry,
            extended_search: self.extended_search,
            seeds: self.seeds.clone(),
        };
        if self.all || selected.is_empty() {
            DiscoveryPlan {
                extended_search: self.extended_search,
                seeds: self.seeds.clone(),
                ..DiscoveryPlan::all()
            }
        } else {
            selected
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };
    config.validate().context("Invalid configuration")?;

    let log_format = cli
        .log_format
        .clone()
        .unwrap_or_else(|| config.logging.format.clone());
    setup_tracing(&log_format, &config.logging.level, cli.verbose)?;

    match cli.command {
        Commands::Discover(flags) => {
            let plan = flags.plan();
            if let Some(depth) = flags.max_depth {
                config.discovery.max_depth = depth;
            }
            tracing::info!(
                plan = ?plan,
                max_depth = config.discovery.max_depth,
                "Starting discover command"
            );
            commands::discover(config, plan).await?;
        }

        Commands::Harvest {
            chunk_size,
            check_liveness,
            workers,
        } => {
            if let Some(size) = chunk_size {
                config.harvest.chunk_size = size.max(1);
            }
            config.harvest.check_liveness |= check_liveness;
            let params = commands::HarvestParams {
                workers,
                worker_args: worker_args(&cli.config, &log_format, cli.verbose),
            };
            tracing::info!(
                chunk_size = config.harvest.chunk_size,
                check_liveness = config.harvest.check_liveness,
                "Starting harvest command"
            );
            commands::harvest(config, params).await?;
        }

        Commands::Stats { json } => {
            commands::stats(config, json).await?;
        }

        Commands::Worker {
            run_hash,
            started_at,
            chunk_index,
            chunk_size,
            urls,
        } => {
            let params = commands::WorkerParams {
                run_hash,
                started_at,
                chunk_index,
                chunk_size,
                urls,
            };
            commands::worker(config, params).await?;
        }
    }

    Ok(())
}

/// Global flags forwarded to worker processes
fn worker_args(config: &Option<PathBuf>, log_format: &str, verbose: bool) -> Vec<String> {
    let mut args = vec!["--log-format".to_string(), log_format.to_string()];
    if let Some(path) = config {
        args.push("--config".to_string());
        args.push(path.display().to_string());
    }
    if verbose {
        args.push("--verbose".to_string());
    }
    args
}

/// `--verbose` wins, then `RUST_LOG`, then the configured level
fn log_filter(level: &str, verbose: bool) -> Result<tracing_subscriber::EnvFilter> {
    use tracing_subscriber::EnvFilter;

    if verbose {
        return Ok(EnvFilter::new("boardhound=debug,info"));
    }
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("boardhound={level},warn")))
        .context("Invalid log level")
}

fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let env_filter = log_filter(level, verbose)?;

    // stdout carries worker reports; logs go to stderr
    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
                .init();
        }
    }

    Ok(())
}
