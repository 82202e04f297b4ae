//! Per-board harvest state machine
//!
//! ```text
//! Start ─▶ FetchPage(n) ─▶ ParseDialect(n) ─▶ Emit(n) ─┬─▶ FetchPage(n+1)  (paginating, page had entries)
//!              │                                        └─▶ Done
//!              └─▶ Error ─▶ Done                          (first page only)
//! ```
//!
//! The only suspension points are the page fetch and handing items to the
//! storage channel. Pages are fetched strictly in order.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use super::classifier::FailureKind;
use crate::crawler::SharedFetcher;
use crate::identity::RunContext;
use crate::models::HarvestItem;
use crate::parser::{BoardParser, PageContext, ParsedPage};
use crate::utils::error::ParseError;

/// Upper bound on pages followed for one board
pub const MAX_PAGES: u32 = 200;

#[derive(Debug)]
enum SpiderState {
    Start,
    FetchPage { page: u32 },
    ParseDialect { page: u32, body: String },
    Emit { page: u32, parsed: ParsedPage },
    Error { kind: FailureKind },
    Done,
}

/// What one spider did
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpiderOutcome {
    pub url: String,
    /// Pages fetched, including the terminal empty page
    pub pages: u32,
    /// Items handed to the storage channel
    pub items: usize,
    /// Elements skipped by the parser
    pub skipped: usize,
    /// First-page failure, routed to the classifier by the caller
    pub failure: Option<FailureKind>,
}

pub struct Spider<'a> {
    run: &'a RunContext,
    url: String,
    url_id: u64,
    parser: BoardParser,
    fetcher: SharedFetcher,
}

impl<'a> Spider<'a> {
    /// Build a spider for a board URL, picking its dialect from the URL shape
    pub fn new(
        run: &'a RunContext,
        url: &str,
        url_id: u64,
        fetcher: SharedFetcher,
    ) -> Result<Self, ParseError> {
        Ok(Self {
            run,
            parser: BoardParser::detect(url)?,
            url: crate::utils::trim_trailing_slash(url).to_string(),
            url_id,
            fetcher,
        })
    }

    pub fn parser(&self) -> BoardParser {
        self.parser
    }

    /// Drive the state machine to completion
    pub async fn run(self, items: mpsc::Sender<HarvestItem>) -> SpiderOutcome {
        let ctx = PageContext::new(self.run, &self.url, self.url_id);
        let mut outcome = SpiderOutcome {
            url: self.url.clone(),
            ..Default::default()
        };
        let mut state = SpiderState::Start;

        loop {
            state = match state {
                SpiderState::Start => {
                    tracing::debug!(url = %self.url, parser = ?self.parser, "Spider starting");
                    SpiderState::FetchPage { page: 1 }
                }

                SpiderState::FetchPage { page } => self.fetch(page, &mut outcome).await,

                SpiderState::ParseDialect { page, body } => {
                    let parsed = self.parser.parse(&body, &ctx.with_page(page));
                    outcome.skipped += parsed.skipped;
                    SpiderState::Emit { page, parsed }
                }

                SpiderState::Emit { page, parsed } => {
                    let has_entries = parsed.has_entries;
                    let mut closed = false;
                    for item in parsed.items {
                        if items.send(item).await.is_err() {
                            closed = true;
                            break;
                        }
                        outcome.items += 1;
                    }

                    if closed {
                        tracing::error!(url = %self.url, "Storage channel closed, stopping spider");
                        SpiderState::Done
                    } else if self.parser.paginates() && has_entries {
                        if page >= MAX_PAGES {
                            tracing::warn!(url = %self.url, page, "Page limit reached");
                            SpiderState::Done
                        } else {
                            SpiderState::FetchPage { page: page + 1 }
                        }
                    } else {
                        SpiderState::Done
                    }
                }

                SpiderState::Error { kind } => {
                    outcome.failure = Some(kind);
                    SpiderState::Done
                }

                SpiderState::Done => break,
            };
        }

        tracing::info!(
            url = %outcome.url,
            pages = outcome.pages,
            items = outcome.items,
            skipped = outcome.skipped,
            failed = outcome.failure.is_some(),
            "Spider finished"
        );
        outcome
    }

    async fn fetch(&self, page: u32, outcome: &mut SpiderOutcome) -> SpiderState {
        let page_url = self.parser.page_url(&self.url, page);
        let kind = match self.fetcher.get(&page_url).await {
            Ok(fetched) if fetched.is_success() => {
                outcome.pages += 1;
                return SpiderState::ParseDialect {
                    page,
                    body: fetched.body,
                };
            }
            Ok(fetched) => {
                tracing::warn!(url = %page_url, status = fetched.status, "Board page returned error status");
                FailureKind::from_status(fetched.status)
            }
            Err(e) => {
                tracing::warn!(url = %page_url, error = %e, "Board page fetch failed");
                FailureKind::from_error(&e)
            }
        };

        // A later page failing says nothing about the board itself
        if page == 1 {
            SpiderState::Error { kind }
        } else {
            tracing::warn!(url = %self.url, page, "Stopping pagination after failed page");
            SpiderState::Done
        }
    }
}
