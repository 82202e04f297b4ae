//! Lever board parsing
//!
//! Postings are grouped in `div.postings-group`. A group names its department
//! either with a category header plus label, or with a label only. Whichever
//! convention the first group uses applies to the whole page:
//!
//! - header convention: `"<header> – <label>"`; a group without its own header
//!   inherits the previous group's header
//! - label convention: `"<label>"`

use scraper::{ElementRef, Html};

use super::selectors::{
    element_text, select_text, CATEGORY_HEADER, CATEGORY_LABEL, POSTINGS_GROUP, POSTING_LOCATION,
    POSTING_NAME, POSTING_TITLE, WORKPLACE_TYPE,
};
use super::{PageContext, ParsedPage};
use crate::identity::SpiderKind;
use crate::models::{HarvestItem, LeverOpening};
use crate::utils::error::ParseError;

/// Separator between header and label under the header convention
pub const DEPARTMENT_SEPARATOR: &str = " – ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Convention {
    Header,
    Label,
}

pub fn parse(document: &Html, ctx: &PageContext<'_>) -> ParsedPage {
    let mut page = ParsedPage::default();
    let mut convention: Option<Convention> = None;
    let mut primary: Option<String> = None;

    for (i, group) in document.select(&POSTINGS_GROUP).enumerate() {
        page.has_entries = true;

        let header = select_text(group, &CATEGORY_HEADER);
        let label = select_text(group, &CATEGORY_LABEL);

        let convention = *convention.get_or_insert(if header.is_some() {
            Convention::Header
        } else {
            Convention::Label
        });

        let departments = match convention {
            Convention::Header => {
                if header.is_some() {
                    primary = header;
                }
                match (&primary, label) {
                    (Some(p), Some(l)) => format!("{p}{DEPARTMENT_SEPARATOR}{l}"),
                    (Some(p), None) => p.clone(),
                    (None, Some(l)) => l,
                    (None, None) => {
                        page.skip(ctx, ParseError::MissingElement("category header"));
                        continue;
                    }
                }
            }
            Convention::Label => match label {
                Some(l) => l,
                None => {
                    page.skip(ctx, ParseError::MissingElement("category label"));
                    continue;
                }
            },
        };

        for (j, posting) in group.select(&POSTING_TITLE).enumerate() {
            let seq = (i as u64) * 1_000 + j as u64;
            match opening(posting, &departments, seq, ctx) {
                Ok(o) => page.items.push(HarvestItem::LeverOpening(o)),
                Err(e) => page.skip(ctx, e),
            }
        }
    }

    tracing::debug!(
        source = %ctx.source,
        items = page.items.len(),
        skipped = page.skipped,
        "Parsed Lever page"
    );
    page
}

fn opening(
    posting: ElementRef<'_>,
    departments: &str,
    seq: u64,
    ctx: &PageContext<'_>,
) -> Result<LeverOpening, ParseError> {
    let href = posting
        .value()
        .attr("href")
        .ok_or(ParseError::MissingAttribute("href"))?;
    let opening_title = posting
        .select(&POSTING_NAME)
        .find_map(element_text)
        .ok_or(ParseError::MissingElement("posting title"))?;

    let now = ctx.timestamp();
    Ok(LeverOpening {
        id: ctx
            .run
            .hasher()
            .record_id(SpiderKind::LeverOpenings, seq, ctx.url_id, now),
        department_names: departments.to_string(),
        opening_title,
        opening_link: ctx.resolve_link(href),
        workplace_type: select_text(posting, &WORKPLACE_TYPE),
        location: select_text(posting, &POSTING_LOCATION),
        company_name: ctx.company_name.clone(),
        source: ctx.source.clone(),
        run_hash: ctx.run.run_hash().to_string(),
        created_at: now,
        updated_at: now,
    })
}
