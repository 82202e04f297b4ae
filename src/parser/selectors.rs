//! CSS selectors for the board dialects and discovery pages
//!
//! Class matches use `*=` where boards append modifier classes
//! (`level-0`, `body--medium`, `location`) and exact classes elsewhere.

use lazy_static::lazy_static;
use scraper::{ElementRef, Selector};

// Helper macro to parse selectors safely at compile time
macro_rules! parse_selector {
    ($s:expr) => {
        Selector::parse($s).expect(concat!("Invalid CSS selector: ", $s))
    };
}

lazy_static! {
    // Legacy Greenhouse (boards.greenhouse.io)
    pub static ref LEGACY_DEPARTMENT_SECTION: Selector = parse_selector!("section[class*='level']");
    pub static ref LEGACY_OPENING: Selector = parse_selector!("div.opening");

    // New-format Greenhouse (job-boards.greenhouse.io)
    pub static ref JOB_POSTS: Selector = parse_selector!("div.job-posts");
    pub static ref JOB_CELL: Selector = parse_selector!("td.cell");
    pub static ref OPENING_TITLE_P: Selector = parse_selector!("p[class*='body--medium']");
    pub static ref OPENING_LOCATION_P: Selector = parse_selector!("p[class*='body--metadata']");

    // Lever (jobs.lever.co)
    pub static ref POSTINGS_GROUP: Selector = parse_selector!("div.postings-group");
    pub static ref CATEGORY_HEADER: Selector = parse_selector!("div[class*='large-category-header']");
    pub static ref CATEGORY_LABEL: Selector = parse_selector!("div[class*='large-category-label']");
    pub static ref POSTING_TITLE: Selector = parse_selector!("a.posting-title");
    pub static ref POSTING_NAME: Selector = parse_selector!("h5");
    pub static ref WORKPLACE_TYPE: Selector = parse_selector!("span[class*='workplaceType']");
    pub static ref POSTING_LOCATION: Selector = parse_selector!("span[class*='location']");

    // Shared
    pub static ref ANCHOR: Selector = parse_selector!("a[href]");
    pub static ref SPAN: Selector = parse_selector!("span");

    // Discovery pages
    pub static ref DIRECTORY_LINK: Selector = parse_selector!(".company-list a");
    pub static ref SEARCH_RESULT: Selector = parse_selector!(".g");
    pub static ref SEARCH_TITLE: Selector = parse_selector!("h3");
}

/// Whitespace-normalized text of an element, `None` when blank
pub fn element_text(element: ElementRef<'_>) -> Option<String> {
    let text = crate::utils::normalize_whitespace(&element.text().collect::<String>());
    (!text.is_empty()).then_some(text)
}

/// Text of the first descendant matching `selector`
pub fn select_text(element: ElementRef<'_>, selector: &Selector) -> Option<String> {
    element.select(selector).find_map(element_text)
}

/// Direct children that are `h1`..`h6`
pub fn heading_children(element: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    element
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|child| is_heading(child.value().name()))
}

fn is_heading(name: &str) -> bool {
    matches!(name, "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
}
