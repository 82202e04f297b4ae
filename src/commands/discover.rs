use anyhow::{Context, Result};
use std::sync::Arc;

use boardhound::config::Config;
use boardhound::crawler::{HttpFetcher, SharedFetcher};
use boardhound::discovery::{DiscoveryEngine, DiscoveryPlan, DiscoveryReport};
use boardhound::storage::open_store;

pub async fn discover(config: Config, plan: DiscoveryPlan) -> Result<()> {
    let store = open_store(&config)
        .await
        .context("Failed to open company store")?;
    let fetcher: SharedFetcher =
        Arc::new(HttpFetcher::from_config(&config).context("Failed to create fetcher")?);

    let mut engine = DiscoveryEngine::new(fetcher, store, config.discovery.clone());
    let report = engine.run(&plan).await?;

    print_summary(&report);
    Ok(())
}

fn print_summary(report: &DiscoveryReport) {
    println!("Company Discovery Summary");
    println!("=========================");
    println!("  Directory scan:     {}", report.directory);
    println!("  Lever probe:        {}", report.probe);
    println!("  Keyword search:     {}", report.search);
    println!("  Recursive:          {}", report.recursive);
    println!("  Industry search:    {}", report.industry);
    println!();
    println!("  Initial companies:  {}", report.before.total);
    println!("  Final companies:    {}", report.after.total);
    println!("  New companies:      {}", report.new_companies());
    println!("  Greenhouse boards:  {}", report.after.greenhouse);
    println!("  Lever boards:       {}", report.after.lever);
    println!("  Ready for scraping: {}", report.after.enabled);
}
