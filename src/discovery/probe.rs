//! Probe Lever boards by company name

use super::catalog::slug_variants;
use super::DiscoveryEngine;
use crate::crawler::url::BoardLink;
use crate::crawler::JitterDelay;
use crate::models::Provider;

impl DiscoveryEngine {
    /// Try each slug variant of every name against Lever. The first variant
    /// answering 200 wins and the remaining variants are skipped.
    pub async fn probe_by_name(&mut self, names: &[&str]) -> usize {
        tracing::info!(names = names.len(), "Probing Lever boards by company name");
        let delay = JitterDelay::new(self.config.probe_delay);
        let mut found = 0;

        for name in names {
            if self.ledger.seen_name(name) {
                tracing::debug!(company = %name, "Name already seen, skipping probe");
                continue;
            }

            let mut hit = None;
            for variant in slug_variants(name) {
                let url = Provider::Lever.board_url(&variant);
                let status = match self.fetcher.get(&url).await {
                    Ok(page) => Some(page.status),
                    Err(e) => {
                        tracing::debug!(url = %url, error = %e, "Probe failed");
                        None
                    }
                };
                delay.wait().await;

                // The probed URL is stored as answered, spaces included
                if status == Some(200) {
                    hit = Some(BoardLink {
                        provider: Provider::Lever,
                        slug: variant,
                        canonical_url: url,
                    });
                    break;
                }
            }

            if let Some(link) = hit {
                if self.register(name, &link).await {
                    found += 1;
                }
            }
            self.ledger.mark_name(name);
        }

        tracing::info!(found, "Lever probe complete");
        found
    }
}
