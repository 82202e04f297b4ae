//! Greenhouse public company directory scan

use scraper::Html;

use super::DiscoveryEngine;
use crate::crawler::url::{normalize, BoardLink};
use crate::crawler::JitterDelay;
use crate::models::Provider;
use crate::parser::selectors::{element_text, DIRECTORY_LINK};
use crate::utils::title_case_slug;

/// Company directory, filtered with `?starts_with=<letter>`
pub const DIRECTORY_URL: &str = "https://boards.greenhouse.io/companies";

/// Directory page URL for one letter
pub fn letter_url(letter: char) -> String {
    format!("{DIRECTORY_URL}?starts_with={letter}")
}

/// Extract `(company name, board link)` pairs from a directory page
pub fn parse_directory(html: &str, page_url: &str) -> Vec<(String, BoardLink)> {
    let document = Html::parse_document(html);
    document
        .select(&DIRECTORY_LINK)
        .filter_map(|anchor| {
            let href = anchor.value().attr("href")?;
            let link = normalize(href, Some(page_url))
                .filter(|link| link.provider == Provider::Greenhouse)?;
            let name = element_text(anchor).unwrap_or_else(|| title_case_slug(&link.slug));
            Some((name, link))
        })
        .collect()
}

impl DiscoveryEngine {
    /// Walk the directory letter by letter. Returns the number of new boards.
    pub async fn directory_scan(&mut self) -> usize {
        tracing::info!("Scanning Greenhouse company directory");
        let delay = JitterDelay::new(self.config.directory_delay);
        let mut found = 0;

        for letter in 'a'..='z' {
            let url = letter_url(letter);
            let companies = match self.fetcher.get(&url).await {
                Ok(page) if page.status == 200 => parse_directory(&page.body, &url),
                Ok(page) => {
                    tracing::warn!(letter = %letter, status = page.status, "Directory page unavailable");
                    Vec::new()
                }
                Err(e) => {
                    tracing::warn!(letter = %letter, error = %e, "Directory fetch failed");
                    Vec::new()
                }
            };

            let mut letter_found = 0;
            for (name, link) in &companies {
                if self.register(name, link).await {
                    letter_found += 1;
                }
            }
            tracing::info!(letter = %letter, listed = companies.len(), new = letter_found, "Directory letter scanned");
            found += letter_found;

            delay.wait().await;
        }

        tracing::info!(found, "Directory scan complete");
        found
    }
}
