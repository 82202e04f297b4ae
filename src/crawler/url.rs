//! Board URL recognition and canonicalization
//!
//! Discovery sees board links in many shapes: relative hrefs, embed widgets,
//! query-string noise, mixed-case slugs. Everything funnels through
//! [`normalize`] so the ledger and the store compare one canonical form.
//!
//! Recognized hosts:
//! - `boards.greenhouse.io` (legacy Greenhouse)
//! - `job-boards.greenhouse.io` (new-format Greenhouse, host kept so the
//!   harvest dialect can still be read off the URL)
//! - `jobs.lever.co`

use url::Url;

use crate::models::Provider;

const BOARD_HOSTS: &[(&str, Provider)] = &[
    ("boards.greenhouse.io", Provider::Greenhouse),
    ("job-boards.greenhouse.io", Provider::Greenhouse),
    ("jobs.lever.co", Provider::Lever),
];

/// First path segments that are site pages, not company boards
const RESERVED_SEGMENTS: &[&str] = &["companies", "embed", "search", "static", "assets"];

/// A recognized board link
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BoardLink {
    pub provider: Provider,
    pub slug: String,
    pub canonical_url: String,
}

/// Canonicalize a link into a board triple, resolving relative hrefs against `base`.
///
/// Returns `None` for anything that is not a company board on a recognized host.
///
/// # Examples
///
/// ```
/// use boardhound::crawler::url::normalize;
/// use boardhound::models::Provider;
///
/// let link = normalize("/Acme?gh_src=abc", Some("https://boards.greenhouse.io/other")).unwrap();
/// assert_eq!(link.provider, Provider::Greenhouse);
/// assert_eq!(link.canonical_url, "https://boards.greenhouse.io/acme");
/// ```
pub fn normalize(raw: &str, base: Option<&str>) -> Option<BoardLink> {
    let raw = raw.trim();
    if raw.is_empty() || raw.starts_with('#') || raw.starts_with("mailto:") {
        return None;
    }

    let parsed = match Url::parse(raw) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let base = Url::parse(base?).ok()?;
            base.join(raw).ok()?
        }
        Err(_) => return None,
    };

    if !matches!(parsed.scheme(), "http" | "https") {
        return None;
    }

    let host = parsed.host_str()?.to_ascii_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host).to_string();
    let (board_host, provider) = BOARD_HOSTS
        .iter()
        .find(|(h, _)| *h == host)
        .map(|(h, p)| (*h, *p))?;

    let first_segment = parsed
        .path_segments()
        .and_then(|mut segments| segments.find(|s| !s.is_empty()))
        .unwrap_or("");

    // Embed widgets carry the slug in `for=`
    let embed_slug = parsed
        .query_pairs()
        .find(|(k, _)| k == "for")
        .map(|(_, v)| v.into_owned());

    let slug = match embed_slug {
        Some(slug) if provider == Provider::Greenhouse => slug,
        _ => first_segment.to_string(),
    }
    .to_ascii_lowercase();

    if !is_valid_slug(&slug) {
        return None;
    }

    Some(BoardLink {
        provider,
        canonical_url: format!("https://{board_host}/{slug}"),
        slug,
    })
}

fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !RESERVED_SEGMENTS.contains(&slug)
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// Company name recorded on harvested rows.
///
/// Embed URLs name the company in `for=`; otherwise the last path segment
/// without its query string is used.
pub fn board_company_name(url: &str) -> String {
    if let Some((_, rest)) = url.split_once("for=") {
        return rest.split('&').next().unwrap_or(rest).to_string();
    }
    let without_query = url.split('?').next().unwrap_or(url);
    without_query
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_greenhouse_link() {
        let link = normalize("https://boards.greenhouse.io/Stripe/jobs/123?gh_jid=1", None).unwrap();
        assert_eq!(link.provider, Provider::Greenhouse);
        assert_eq!(link.slug, "stripe");
        assert_eq!(link.canonical_url, "https://boards.greenhouse.io/stripe");
    }

    #[test]
    fn test_new_format_host_preserved() {
        let link = normalize("https://job-boards.greenhouse.io/acme", None).unwrap();
        assert_eq!(link.canonical_url, "https://job-boards.greenhouse.io/acme");
    }

    #[test]
    fn test_lever_link() {
        let link = normalize("http://www.jobs.lever.co/Netflix/", None).unwrap();
        assert_eq!(link.provider, Provider::Lever);
        assert_eq!(link.canonical_url, "https://jobs.lever.co/netflix");
    }

    #[test]
    fn test_relative_link_resolved() {
        let link = normalize("../beta", Some("https://jobs.lever.co/acme/")).unwrap();
        assert_eq!(link.canonical_url, "https://jobs.lever.co/beta");
        assert!(normalize("/careers", None).is_none());
    }

    #[test]
    fn test_embed_link() {
        let link = normalize(
            "https://boards.greenhouse.io/embed/job_board?for=Acme&b=https://acme.com",
            None,
        )
        .unwrap();
        assert_eq!(link.canonical_url, "https://boards.greenhouse.io/acme");
    }

    #[test]
    fn test_non_board_links_rejected() {
        assert!(normalize("https://example.com/jobs", None).is_none());
        assert!(normalize("https://boards.greenhouse.io/", None).is_none());
        assert!(normalize("https://boards.greenhouse.io/companies?starts_with=a", None).is_none());
        assert!(normalize("mailto:jobs@acme.com", None).is_none());
        assert!(normalize("ftp://jobs.lever.co/acme", None).is_none());
    }

    #[test]
    fn test_board_company_name() {
        assert_eq!(board_company_name("https://boards.greenhouse.io/acme"), "acme");
        assert_eq!(board_company_name("https://jobs.lever.co/acme/"), "acme");
        assert_eq!(
            board_company_name("https://boards.greenhouse.io/embed/job_board?for=acme"),
            "acme"
        );
        assert_eq!(board_company_name("https://jobs.lever.co/beta?team=x"), "beta");
    }
}
