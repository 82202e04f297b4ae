//! Greenhouse board parsing, legacy and new-format layouts

use scraper::{ElementRef, Html};

use super::selectors::{
    element_text, heading_children, select_text, ANCHOR, JOB_CELL, JOB_POSTS,
    LEGACY_DEPARTMENT_SECTION, LEGACY_OPENING, OPENING_LOCATION_P, OPENING_TITLE_P, SPAN,
};
use super::{PageContext, ParsedPage};
use crate::identity::SpiderKind;
use crate::models::{HarvestItem, JobDepartment, JobOpening};
use crate::utils::error::ParseError;

/// Category recorded for new-format departments, which expose no nesting level
const NEW_FORMAT_CATEGORY: &str = "level-0";

// ============================================================================
// Legacy layout
// ============================================================================

/// `boards.greenhouse.io`: `<section class="level-N">` departments with an
/// id-bearing heading, and `<div class="opening">` rows.
pub fn parse_legacy(document: &Html, ctx: &PageContext<'_>) -> ParsedPage {
    let mut page = ParsedPage::default();

    for (i, section) in document.select(&LEGACY_DEPARTMENT_SECTION).enumerate() {
        page.has_entries = true;
        match legacy_department(section, i as u64, ctx) {
            Ok(dept) => page.items.push(HarvestItem::Department(dept)),
            Err(e) => page.skip(ctx, e),
        }
    }

    for (i, row) in document.select(&LEGACY_OPENING).enumerate() {
        page.has_entries = true;
        match legacy_opening(row, i as u64, ctx) {
            Ok(opening) => page.items.push(HarvestItem::Opening(opening)),
            Err(e) => page.skip(ctx, e),
        }
    }

    tracing::debug!(
        source = %ctx.source,
        items = page.items.len(),
        skipped = page.skipped,
        "Parsed legacy Greenhouse page"
    );
    page
}

fn legacy_department(
    section: ElementRef<'_>,
    seq: u64,
    ctx: &PageContext<'_>,
) -> Result<JobDepartment, ParseError> {
    let heading = heading_children(section)
        .next()
        .ok_or(ParseError::MissingElement("department heading"))?;
    let department_id = heading
        .value()
        .attr("id")
        .ok_or(ParseError::MissingAttribute("id"))?
        .to_string();
    let department_name =
        element_text(heading).ok_or(ParseError::MissingElement("department name"))?;
    let department_category = section.value().attr("class").unwrap_or_default().to_string();

    let now = ctx.timestamp();
    Ok(JobDepartment {
        id: ctx.run.hasher().record_id(
            SpiderKind::GreenhouseDepartments,
            seq,
            ctx.url_id,
            now,
        ),
        department_id,
        department_name,
        department_category,
        source: ctx.source.clone(),
        company_name: ctx.company_name.clone(),
        run_hash: ctx.run.run_hash().to_string(),
        created_at: now,
        updated_at: now,
    })
}

fn legacy_opening(
    row: ElementRef<'_>,
    seq: u64,
    ctx: &PageContext<'_>,
) -> Result<JobOpening, ParseError> {
    let anchor = row
        .select(&ANCHOR)
        .next()
        .ok_or(ParseError::MissingElement("opening link"))?;
    let href = anchor
        .value()
        .attr("href")
        .ok_or(ParseError::MissingAttribute("href"))?;
    let opening_title = element_text(anchor).ok_or(ParseError::MissingElement("opening title"))?;

    let now = ctx.timestamp();
    Ok(JobOpening {
        id: ctx
            .run
            .hasher()
            .record_id(SpiderKind::GreenhouseOpenings, seq, ctx.url_id, now),
        department_ids: row
            .value()
            .attr("department_id")
            .unwrap_or_default()
            .to_string(),
        office_ids: row.value().attr("office_id").map(str::to_string),
        opening_title,
        opening_link: ctx.resolve_link(href),
        location: select_text(row, &SPAN),
        source: ctx.source.clone(),
        run_hash: ctx.run.run_hash().to_string(),
        created_at: now,
        updated_at: now,
    })
}

// ============================================================================
// New-format layout
// ============================================================================

/// `job-boards.greenhouse.io`: each `div.job-posts` holds heading(s) naming
/// the department and a table of `td.cell` rows. Departments have no stable
/// id, so identity is `<company>_<heading>`.
///
/// Sequence numbers fold in the page so ids stay unique across pages.
pub fn parse_new_format(document: &Html, ctx: &PageContext<'_>) -> ParsedPage {
    let mut page = ParsedPage::default();
    let page_base = u64::from(ctx.page);
    let mut dept_seq = 0u64;

    for (i, container) in document.select(&JOB_POSTS).enumerate() {
        page.has_entries = true;

        let headings: Vec<String> = heading_children(container).filter_map(element_text).collect();
        for name in &headings {
            page.items
                .push(HarvestItem::Department(new_format_department(
                    name,
                    page_base * 10_000 + dept_seq,
                    ctx,
                )));
            dept_seq += 1;
        }

        let Some(primary) = headings.first() else {
            page.skip(ctx, ParseError::MissingElement("job-posts heading"));
            continue;
        };
        let department_ids = format!("{}_{}", ctx.company_name, primary);

        for (j, cell) in container.select(&JOB_CELL).enumerate() {
            let seq = page_base * 1_000_000 + (i as u64) * 1_000 + j as u64;
            match new_format_opening(cell, &department_ids, seq, ctx) {
                Ok(opening) => page.items.push(HarvestItem::Opening(opening)),
                Err(e) => page.skip(ctx, e),
            }
        }
    }

    tracing::debug!(
        source = %ctx.source,
        page = ctx.page,
        items = page.items.len(),
        skipped = page.skipped,
        "Parsed new-format Greenhouse page"
    );
    page
}

fn new_format_department(name: &str, seq: u64, ctx: &PageContext<'_>) -> JobDepartment {
    let now = ctx.timestamp();
    JobDepartment {
        id: ctx.run.hasher().record_id(
            SpiderKind::GreenhouseDepartments,
            seq,
            ctx.url_id,
            now,
        ),
        department_id: format!("{}_{}", ctx.company_name, name),
        department_name: name.to_string(),
        department_category: NEW_FORMAT_CATEGORY.to_string(),
        source: ctx.source.clone(),
        company_name: ctx.company_name.clone(),
        run_hash: ctx.run.run_hash().to_string(),
        created_at: now,
        updated_at: now,
    }
}

fn new_format_opening(
    cell: ElementRef<'_>,
    department_ids: &str,
    seq: u64,
    ctx: &PageContext<'_>,
) -> Result<JobOpening, ParseError> {
    let href = cell
        .select(&ANCHOR)
        .find_map(|a| a.value().attr("href"))
        .ok_or(ParseError::MissingAttribute("href"))?;
    let opening_title =
        select_text(cell, &OPENING_TITLE_P).ok_or(ParseError::MissingElement("opening title"))?;

    let now = ctx.timestamp();
    Ok(JobOpening {
        id: ctx
            .run
            .hasher()
            .record_id(SpiderKind::GreenhouseOpenings, seq, ctx.url_id, now),
        department_ids: department_ids.to_string(),
        office_ids: None,
        opening_title,
        opening_link: ctx.resolve_link(href),
        location: select_text(cell, &OPENING_LOCATION_P),
        source: ctx.source.clone(),
        run_hash: ctx.run.run_hash().to_string(),
        created_at: now,
        updated_at: now,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::RunContext;

    const LEGACY: &str = r#"
        <html><body>
          <section class="level-0">
            <h3 id="4001">Engineering</h3>
            <div class="opening" department_id="4001" office_id="77">
              <a href="/acme/jobs/1">Backend Engineer</a>
              <span class="location">Remote</span>
            </div>
            <div class="opening" department_id="4001">
              <a href="https://boards.greenhouse.io/acme/jobs/2">Frontend Engineer</a>
            </div>
          </section>
          <section class="level-1">
            <h4 id="4002">Platform</h4>
          </section>
          <section class="level-0"><p>No heading here</p></section>
        </body></html>
    "#;

    const NEW_FORMAT: &str = r#"
        <html><body>
          <div class="job-posts">
            <h3 class="section-header">Engineering</h3>
            <table><tbody>
              <tr class="job-post"><td class="cell">
                <a href="https://job-boards.greenhouse.io/acme/jobs/10">
                  <p class="body body--medium">Site Reliability Engineer</p>
                  <p class="body body__secondary body--metadata">New York</p>
                </a>
              </td></tr>
              <tr class="job-post"><td class="cell"><a href="/acme/jobs/11"></a></td></tr>
            </tbody></table>
          </div>
          <div class="job-posts">
            <h3>Sales</h3>
            <table><tbody>
              <tr><td class="cell"><a href="/acme/jobs/12"><p class="body--medium">Account Executive</p></a></td></tr>
            </tbody></table>
          </div>
        </body></html>
    "#;

    fn ctx<'a>(run: &'a RunContext, url: &str) -> PageContext<'a> {
        PageContext::new(run, url, 0)
    }

    #[test]
    fn test_legacy_departments_and_openings() {
        let run = RunContext::at("salt", 1_700_000_000);
        let ctx = ctx(&run, "https://boards.greenhouse.io/acme");
        let page = parse_legacy(&Html::parse_document(LEGACY), &ctx);

        let departments: Vec<_> = page
            .items
            .iter()
            .filter_map(|i| match i {
                HarvestItem::Department(d) => Some(d),
                _ => None,
            })
            .collect();
        assert_eq!(departments.len(), 2);
        assert_eq!(departments[0].department_id, "4001");
        assert_eq!(departments[0].department_name, "Engineering");
        assert_eq!(departments[0].department_category, "level-0");
        assert_eq!(departments[1].department_category, "level-1");
        assert_eq!(page.skipped, 1);

        let openings: Vec<_> = page
            .items
            .iter()
            .filter_map(|i| match i {
                HarvestItem::Opening(o) => Some(o),
                _ => None,
            })
            .collect();
        assert_eq!(openings.len(), 2);
        assert_eq!(openings[0].opening_title, "Backend Engineer");
        assert_eq!(openings[0].opening_link, "https://boards.greenhouse.io/acme/jobs/1");
        assert_eq!(openings[0].office_ids.as_deref(), Some("77"));
        assert_eq!(openings[0].location.as_deref(), Some("Remote"));
        assert_eq!(openings[1].location, None);
        assert_eq!(openings[1].run_hash, run.run_hash());
    }

    #[test]
    fn test_new_format_page() {
        let run = RunContext::at("salt", 1_700_000_000);
        let ctx = ctx(&run, "https://job-boards.greenhouse.io/acme");
        let page = parse_new_format(&Html::parse_document(NEW_FORMAT), &ctx);

        assert!(page.has_entries);
        assert_eq!(page.skipped, 1);

        let names: Vec<_> = page
            .items
            .iter()
            .filter_map(|i| match i {
                HarvestItem::Department(d) => Some((d.department_id.as_str(), d.department_category.as_str())),
                _ => None,
            })
            .collect();
        assert_eq!(names, vec![("acme_Engineering", "level-0"), ("acme_Sales", "level-0")]);

        let openings: Vec<_> = page
            .items
            .iter()
            .filter_map(|i| match i {
                HarvestItem::Opening(o) => Some(o),
                _ => None,
            })
            .collect();
        assert_eq!(openings.len(), 2);
        assert_eq!(openings[0].department_ids, "acme_Engineering");
        assert_eq!(openings[0].opening_title, "Site Reliability Engineer");
        assert_eq!(openings[0].location.as_deref(), Some("New York"));
        assert_eq!(openings[1].department_ids, "acme_Sales");
        assert_eq!(openings[1].opening_link, "https://job-boards.greenhouse.io/acme/jobs/12");
    }

    #[test]
    fn test_new_format_ids_differ_across_pages() {
        let run = RunContext::at("salt", 1_700_000_000);
        let base = ctx(&run, "https://job-boards.greenhouse.io/acme");
        let doc = Html::parse_document(NEW_FORMAT);
        let first = parse_new_format(&doc, &base.with_page(1));
        let second = parse_new_format(&doc, &base.with_page(2));

        let first_ids: std::collections::HashSet<_> = first.items.iter().map(|i| i.id().to_string()).collect();
        assert_eq!(first_ids.len(), first.items.len());
        assert!(second.items.iter().all(|i| !first_ids.contains(i.id())));
    }

    #[test]
    fn test_empty_page_has_no_entries() {
        let run = RunContext::at("salt", 1);
        let ctx = ctx(&run, "https://job-boards.greenhouse.io/acme");
        let page = parse_new_format(&Html::parse_document("<html><body><p>No jobs</p></body></html>"), &ctx);
        assert!(!page.has_entries);
        assert!(page.items.is_empty());
    }
}
