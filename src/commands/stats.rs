use anyhow::{Context, Result};

use boardhound::config::Config;
use boardhound::storage::{open_store, BoardStore};

pub async fn stats(config: Config, json: bool) -> Result<()> {
    let store = open_store(&config)
        .await
        .context("Failed to open company store")?;
    let stats = store.stats().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("Company Board Statistics");
    println!("========================");
    println!("  Total companies:   {}", stats.total);
    println!("  Enabled boards:    {}", stats.enabled);
    println!("  Greenhouse boards: {}", stats.greenhouse);
    println!("  Lever boards:      {}", stats.lever);
    Ok(())
}
