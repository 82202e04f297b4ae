//! Web search discovery
//!
//! Queries a search backend and keeps result anchors that point at a board.
//! The result heading becomes the company name; the slug comes from the link.

use scraper::Html;
use url::Url;

use super::catalog::{extended_search_terms, industry_queries, search_terms};
use super::DiscoveryEngine;
use crate::crawler::url::{normalize, BoardLink};
use crate::crawler::JitterDelay;
use crate::models::Provider;
use crate::parser::selectors::{element_text, ANCHOR, SEARCH_RESULT, SEARCH_TITLE};

/// Company name used when a result has no heading
const UNKNOWN_COMPANY: &str = "Unknown";

/// Build the search request URL
pub fn search_url(endpoint: &str, query: &str, max_results: usize) -> Option<String> {
    Url::parse_with_params(endpoint, &[("q", query), ("num", &max_results.to_string())])
        .ok()
        .map(String::from)
}

/// Extract board links from a result page, optionally restricted to one provider
pub fn parse_results(
    html: &str,
    page_url: &str,
    provider: Option<Provider>,
) -> Vec<(String, BoardLink)> {
    let document = Html::parse_document(html);
    let mut found = Vec::new();

    for result in document.select(&SEARCH_RESULT) {
        let Some(href) = result
            .select(&ANCHOR)
            .next()
            .and_then(|a| a.value().attr("href"))
        else {
            continue;
        };
        let target = unwrap_redirect(href, page_url).unwrap_or_else(|| href.to_string());

        let Some(link) = normalize(&target, Some(page_url)) else {
            continue;
        };
        if provider.is_some_and(|p| p != link.provider) {
            continue;
        }

        let name = result
            .select(&SEARCH_TITLE)
            .find_map(element_text)
            .unwrap_or_else(|| UNKNOWN_COMPANY.to_string());
        found.push((name, link));
    }
    found
}

/// Result anchors may be wrapped as `/url?q=<target>&...`
fn unwrap_redirect(href: &str, page_url: &str) -> Option<String> {
    let url = Url::parse(page_url).ok()?.join(href).ok()?;
    if url.path() != "/url" {
        return None;
    }
    url.query_pairs()
        .find(|(k, _)| k == "q" || k == "url")
        .map(|(_, v)| v.into_owned())
}

impl DiscoveryEngine {
    /// Run one search query and register every board link in the results
    pub async fn keyword_search(
        &mut self,
        query: &str,
        provider: Option<Provider>,
        max_results: usize,
    ) -> usize {
        let Some(url) = search_url(&self.config.search_url, query, max_results) else {
            tracing::error!(endpoint = %self.config.search_url, "Invalid search endpoint");
            return 0;
        };
        tracing::info!(query = %query, "Searching for company boards");

        let results = match self.fetcher.get(&url).await {
            Ok(page) if page.status == 200 => parse_results(&page.body, &url, provider),
            Ok(page) => {
                tracing::warn!(query = %query, status = page.status, "Search request failed");
                return 0;
            }
            Err(e) => {
                tracing::error!(query = %query, error = %e, "Search request failed");
                return 0;
            }
        };

        let mut found = 0;
        for (name, link) in &results {
            if self.register(name, link).await {
                found += 1;
            }
        }
        tracing::info!(query = %query, results = results.len(), found, "Search complete");
        found
    }

    /// Search each provider's curated terms
    pub async fn provider_search(&mut self, extended: bool) -> usize {
        let delay = JitterDelay::new(self.config.search_delay);
        let max_results = self.config.search_results;
        let mut found = 0;

        for provider in Provider::ALL {
            let terms = if extended {
                extended_search_terms(provider)
            } else {
                search_terms(provider)
            };
            for term in terms {
                found += self.keyword_search(term, Some(provider), max_results).await;
                delay.wait().await;
            }
        }

        tracing::info!(found, extended, "Provider search complete");
        found
    }

    /// Search every keyword of every industry bucket
    pub async fn industry_search(&mut self, patterns: &[(&str, &[&str])]) -> usize {
        let delay = JitterDelay::new(self.config.industry_delay);
        let mut found = 0;

        for (industry, keywords) in patterns {
            let mut industry_found = 0;
            for keyword in keywords.iter() {
                for (query, max_results) in industry_queries(keyword) {
                    industry_found += self.keyword_search(&query, None, max_results).await;
                    delay.wait().await;
                }
            }
            tracing::info!(industry = %industry, found = industry_found, "Industry search complete");
            found += industry_found;
        }
        found
    }
}
