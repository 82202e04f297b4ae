//! Breadth-first link following from known boards

use std::collections::VecDeque;

use scraper::Html;

use super::catalog::HIRING_KEYWORDS;
use super::DiscoveryEngine;
use crate::crawler::url::{normalize, BoardLink};
use crate::crawler::JitterDelay;
use crate::parser::selectors::ANCHOR;
use crate::utils::title_case_slug;

/// Board links behind hiring-related anchors on a page
pub fn hiring_links(html: &str, page_url: &str) -> Vec<BoardLink> {
    let document = Html::parse_document(html);
    let mut links: Vec<BoardLink> = Vec::new();

    for anchor in document.select(&ANCHOR) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let lowered = href.to_lowercase();
        if !HIRING_KEYWORDS.iter().any(|k| lowered.contains(k)) {
            continue;
        }
        if let Some(link) = normalize(href, Some(page_url)) {
            if !links.contains(&link) {
                links.push(link);
            }
        }
    }
    links
}

impl DiscoveryEngine {
    /// Follow hiring links outward from `seeds`.
    ///
    /// A frontier entry is processed only while `depth < max_depth` and only
    /// once per run. Newly registered boards are enqueued one level deeper.
    pub async fn recursive_discovery(&mut self, seeds: Vec<String>, max_depth: usize) -> usize {
        tracing::info!(seeds = seeds.len(), max_depth, "Starting recursive discovery");
        let delay = JitterDelay::new(self.config.recursive_delay);
        let mut frontier: VecDeque<(String, usize)> =
            seeds.into_iter().map(|url| (url, 0)).collect();
        let mut found = 0;

        while let Some((url, depth)) = frontier.pop_front() {
            if depth >= max_depth || !self.ledger.visit(&url) {
                continue;
            }

            tracing::info!(url = %url, depth, "Recursively checking");
            delay.wait().await;

            let links = match self.fetcher.get(&url).await {
                Ok(page) if page.status == 200 => hiring_links(&page.body, &url),
                Ok(page) => {
                    tracing::debug!(url = %url, status = page.status, "Skipping page");
                    continue;
                }
                Err(e) => {
                    tracing::error!(url = %url, error = %e, "Recursive fetch failed");
                    continue;
                }
            };

            for link in links {
                let name = title_case_slug(&link.slug);
                if self.register(&name, &link).await {
                    found += 1;
                    if depth + 1 < max_depth {
                        frontier.push_back((link.canonical_url, depth + 1));
                    }
                }
            }
        }

        tracing::info!(found, "Recursive discovery complete");
        found
    }
}
