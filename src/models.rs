// Core data structures for boardhound

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Applicant-tracking platform hosting a job board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Greenhouse,
    Lever,
}

impl Provider {
    pub const ALL: [Provider; 2] = [Provider::Greenhouse, Provider::Lever];

    /// Stored name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Greenhouse => "greenhouse",
            Self::Lever => "lever",
        }
    }

    /// Canonical board host
    pub fn host(&self) -> &'static str {
        match self {
            Self::Greenhouse => "boards.greenhouse.io",
            Self::Lever => "jobs.lever.co",
        }
    }

    /// Detect the provider from a board URL.
    ///
    /// The second dot-separated label decides it, so both
    /// `boards.greenhouse.io` and `job-boards.greenhouse.io` map to Greenhouse.
    pub fn from_url(url: &str) -> Option<Self> {
        let host = url::Url::parse(url).ok()?.host_str()?.to_ascii_lowercase();
        Self::from_host(&host)
    }

    /// Detect the provider from a bare host name
    pub fn from_host(host: &str) -> Option<Self> {
        let host = host.strip_prefix("www.").unwrap_or(host);
        match host.split('.').nth(1) {
            Some("greenhouse") if host.ends_with("greenhouse.io") => Some(Self::Greenhouse),
            Some("lever") if host.ends_with("lever.co") => Some(Self::Lever),
            _ => None,
        }
    }

    /// `LIKE` pattern matching this provider's board URLs, including rows
    /// written before the `provider` column existed
    pub fn url_pattern(&self) -> &'static str {
        match self {
            Self::Greenhouse => "%boards.greenhouse.io%",
            Self::Lever => "%jobs.lever.co%",
        }
    }

    /// Canonical board URL for a slug
    pub fn board_url(&self, slug: &str) -> String {
        format!("https://{}/{}", self.host(), slug)
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "greenhouse" => Ok(Self::Greenhouse),
            "lever" => Ok(Self::Lever),
            other => Err(format!("Unknown provider: {other}")),
        }
    }
}

/// A company job board found by discovery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyBoard {
    pub company_name: String,
    pub url: String,
    pub provider: Provider,
}

impl CompanyBoard {
    pub fn new(company_name: impl Into<String>, url: impl Into<String>, provider: Provider) -> Self {
        Self {
            company_name: company_name.into(),
            url: url.into(),
            provider,
        }
    }
}

/// Department section of a Greenhouse board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDepartment {
    pub id: String,
    pub department_id: String,
    pub department_name: String,
    pub department_category: String,
    pub source: String,
    pub company_name: String,
    pub run_hash: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Job posting row of a Greenhouse board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobOpening {
    pub id: String,
    pub department_ids: String,
    pub office_ids: Option<String>,
    pub opening_title: String,
    pub opening_link: String,
    pub location: Option<String>,
    pub source: String,
    pub run_hash: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Job posting row of a Lever board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeverOpening {
    pub id: String,
    pub department_names: String,
    pub opening_title: String,
    pub opening_link: String,
    pub workplace_type: Option<String>,
    pub location: Option<String>,
    pub company_name: String,
    pub source: String,
    pub run_hash: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Record emitted by a harvest spider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HarvestItem {
    Department(JobDepartment),
    Opening(JobOpening),
    LeverOpening(LeverOpening),
}

impl HarvestItem {
    pub fn id(&self) -> &str {
        match self {
            Self::Department(d) => &d.id,
            Self::Opening(o) => &o.id,
            Self::LeverOpening(o) => &o.id,
        }
    }
}

/// Company store counters reported before and after runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    pub total: u64,
    pub enabled: u64,
    pub greenhouse: u64,
    pub lever: u64,
}

impl StoreStats {
    /// Count for a single provider
    pub fn for_provider(&self, provider: Provider) -> u64 {
        match provider {
            Provider::Greenhouse => self.greenhouse,
            Provider::Lever => self.lever,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_from_url() {
        assert_eq!(
            Provider::from_url("https://boards.greenhouse.io/acme"),
            Some(Provider::Greenhouse)
        );
        assert_eq!(
            Provider::from_url("https://job-boards.greenhouse.io/acme"),
            Some(Provider::Greenhouse)
        );
        assert_eq!(
            Provider::from_url("https://jobs.lever.co/acme"),
            Some(Provider::Lever)
        );
        assert_eq!(
            Provider::from_url("https://www.jobs.lever.co/acme"),
            Some(Provider::Lever)
        );
        assert_eq!(Provider::from_host("www.boards.greenhouse.io"), Some(Provider::Greenhouse));
        assert_eq!(Provider::from_url("https://example.com/careers"), None);
        assert_eq!(Provider::from_url("not a url"), None);
    }

    #[test]
    fn test_provider_round_trip_str() {
        for provider in Provider::ALL {
            assert_eq!(provider.as_str().parse::<Provider>().unwrap(), provider);
        }
        assert!("workday".parse::<Provider>().is_err());
    }

    #[test]
    fn test_board_url() {
        assert_eq!(
            Provider::Lever.board_url("acme"),
            "https://jobs.lever.co/acme"
        );
    }

    #[test]
    fn test_harvest_item_serializes_with_kind() {
        let item = HarvestItem::Department(JobDepartment {
            id: "abc".into(),
            department_id: "acme_Engineering".into(),
            department_name: "Engineering".into(),
            department_category: "level-0".into(),
            source: "https://job-boards.greenhouse.io/acme".into(),
            company_name: "acme".into(),
            run_hash: "run".into(),
            created_at: 1,
            updated_at: 1,
        });
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["kind"], "department");
        assert_eq!(item.id(), "abc");
    }
}
