//! Board page parsing
//!
//! Each provider serves one of several HTML layouts. The layout is decided by
//! URL shape alone, before anything is fetched:
//!
//! | URL host                    | Parser                 | Paginates |
//! |-----------------------------|------------------------|-----------|
//! | `boards.greenhouse.io`      | `LegacyGreenhouse`     | no        |
//! | `job-boards.greenhouse.io`  | `NewFormatGreenhouse`  | `?page=N` |
//! | `jobs.lever.co`             | `Lever`                | no        |
//!
//! Parsing is element-tolerant: a row missing a required field is skipped and
//! counted, it never fails the page.

pub mod greenhouse;
pub mod lever;
pub mod selectors;

use scraper::Html;

use crate::identity::RunContext;
use crate::models::{HarvestItem, Provider};
use crate::utils::error::ParseError;

/// Dialect-specific parser for one board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardParser {
    LegacyGreenhouse,
    NewFormatGreenhouse,
    Lever,
}

impl BoardParser {
    /// Pick the parser for a board URL
    pub fn detect(url: &str) -> Result<Self, ParseError> {
        match Provider::from_url(url) {
            Some(Provider::Lever) => Ok(Self::Lever),
            Some(Provider::Greenhouse) if is_job_boards_host(url) => Ok(Self::NewFormatGreenhouse),
            Some(Provider::Greenhouse) => Ok(Self::LegacyGreenhouse),
            None => Err(ParseError::UnsupportedBoard(url.to_string())),
        }
    }

    pub fn provider(&self) -> Provider {
        match self {
            Self::LegacyGreenhouse | Self::NewFormatGreenhouse => Provider::Greenhouse,
            Self::Lever => Provider::Lever,
        }
    }

    /// Whether more pages follow a page that had entries
    pub fn paginates(&self) -> bool {
        matches!(self, Self::NewFormatGreenhouse)
    }

    /// URL of page `page` (1-based) of a board
    pub fn page_url(&self, base: &str, page: u32) -> String {
        if page <= 1 || !self.paginates() {
            return base.to_string();
        }
        match url::Url::parse(base) {
            Ok(mut url) => {
                let retained: Vec<(String, String)> = url
                    .query_pairs()
                    .filter(|(k, _)| k != "page")
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect();
                {
                    let mut pairs = url.query_pairs_mut();
                    pairs.clear();
                    for (k, v) in &retained {
                        pairs.append_pair(k, v);
                    }
                    pairs.append_pair("page", &page.to_string());
                }
                url.to_string()
            }
            Err(_) => format!("{base}?page={page}"),
        }
    }

    /// Extract records from one page
    pub fn parse(&self, html: &str, ctx: &PageContext<'_>) -> ParsedPage {
        let document = Html::parse_document(html);
        match self {
            Self::LegacyGreenhouse => greenhouse::parse_legacy(&document, ctx),
            Self::NewFormatGreenhouse => greenhouse::parse_new_format(&document, ctx),
            Self::Lever => lever::parse(&document, ctx),
        }
    }
}

/// New-format boards live on the `job-boards.` host
fn is_job_boards_host(url: &str) -> bool {
    url.split('.')
        .next()
        .and_then(|head| head.rsplit('/').next())
        .is_some_and(|label| label == "job-boards")
}

/// Everything a parser needs besides the HTML
#[derive(Debug, Clone)]
pub struct PageContext<'a> {
    pub run: &'a RunContext,
    /// Board URL without trailing slash
    pub source: String,
    pub company_name: String,
    pub url_id: u64,
    /// 1-based page number
    pub page: u32,
}

impl<'a> PageContext<'a> {
    pub fn new(run: &'a RunContext, board_url: &str, url_id: u64) -> Self {
        let source = crate::utils::trim_trailing_slash(board_url).to_string();
        let company_name = crate::crawler::url::board_company_name(&source);
        Self {
            run,
            source,
            company_name,
            url_id,
            page: 1,
        }
    }

    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page,
            ..self.clone()
        }
    }

    /// Timestamp stamped on every record of the run
    pub fn timestamp(&self) -> i64 {
        self.run.started_at()
    }

    /// Absolute form of an href found on this board
    pub fn resolve_link(&self, href: &str) -> String {
        url::Url::parse(&self.source)
            .and_then(|base| base.join(href))
            .map(|u| u.to_string())
            .unwrap_or_else(|_| href.to_string())
    }
}

/// Records extracted from one page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPage {
    pub items: Vec<HarvestItem>,
    /// Elements dropped because a required field was missing
    pub skipped: usize,
    /// Whether the page had any department or posting containers
    pub has_entries: bool,
}

impl ParsedPage {
    pub(crate) fn skip(&mut self, ctx: &PageContext<'_>, err: ParseError) {
        self.skipped += 1;
        tracing::warn!(
            source = %ctx.source,
            page = ctx.page,
            error = %err,
            "Skipping unparseable element"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_dialect() {
        assert_eq!(
            BoardParser::detect("https://boards.greenhouse.io/acme").unwrap(),
            BoardParser::LegacyGreenhouse
        );
        assert_eq!(
            BoardParser::detect("https://job-boards.greenhouse.io/acme").unwrap(),
            BoardParser::NewFormatGreenhouse
        );
        assert_eq!(
            BoardParser::detect("https://jobs.lever.co/acme").unwrap(),
            BoardParser::Lever
        );
        assert_eq!(
            BoardParser::detect("https://www.jobs.lever.co/acme").unwrap(),
            BoardParser::Lever
        );
        assert!(BoardParser::detect("https://example.com/jobs").is_err());
    }

    #[test]
    fn test_page_url() {
        let parser = BoardParser::NewFormatGreenhouse;
        let base = "https://job-boards.greenhouse.io/acme";
        assert_eq!(parser.page_url(base, 1), base);
        assert_eq!(parser.page_url(base, 2), format!("{base}?page=2"));
        assert_eq!(
            parser.page_url("https://job-boards.greenhouse.io/acme?page=2", 3),
            "https://job-boards.greenhouse.io/acme?page=3"
        );
        assert_eq!(BoardParser::Lever.page_url("https://jobs.lever.co/acme", 2), "https://jobs.lever.co/acme");
    }

    #[test]
    fn test_page_context_company_name() {
        let run = RunContext::at("salt", 1);
        let ctx = PageContext::new(&run, "https://boards.greenhouse.io/acme/", 4);
        assert_eq!(ctx.source, "https://boards.greenhouse.io/acme");
        assert_eq!(ctx.company_name, "acme");
        assert_eq!(
            ctx.resolve_link("/acme/jobs/1"),
            "https://boards.greenhouse.io/acme/jobs/1"
        );
        assert_eq!(ctx.with_page(3).page, 3);
    }
}
