//! Run-local dedup sets
//!
//! The ledger only saves redundant store round-trips and re-fetches within a
//! single discovery run. The store's unique constraint remains the authority.

use std::collections::HashSet;

#[derive(Debug, Default)]
pub struct Ledger {
    /// Canonical board URLs registered this run
    urls: HashSet<String>,
    /// Lowercased company names registered or probed this run
    names: HashSet<String>,
    /// Pages fetched by recursive discovery this run
    visited: HashSet<String>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seen(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    /// Returns `true` when the URL was not yet marked
    pub fn mark(&mut self, url: &str) -> bool {
        self.urls.insert(url.to_string())
    }

    pub fn seen_name(&self, name: &str) -> bool {
        self.names.contains(&name_key(name))
    }

    pub fn mark_name(&mut self, name: &str) -> bool {
        self.names.insert(name_key(name))
    }

    /// Record a page visit. Returns `false` if it was already visited.
    pub fn visit(&mut self, url: &str) -> bool {
        self.visited.insert(url.to_string())
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}
