// Menu extraction for a single dining location page.
//
// Each meal period on a location page is introduced by an anchor element (e.g. `#lunchmenu`),
// followed by a div holding all of that period's content. Inside that, every sub-category is a
// `div.force-left-full-width` with an id like `lunch-grill`, a heading, and a number of recipe
// cards.
//
// The markup is not consistent across locations, so both finding the sections and naming them are
// done in stages, where each stage is tried in order until one yields something.

use crate::{
    config::PeriodAnchor,
    error::ScrapeError,
    models::{Category, LocationMenu, LocationStatus, MealPeriod, PeriodMenu},
    util::*,
};
use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, trace, warn};

pub static UNKNOWN_CATEGORY: &str = "Unknown Category";

lazy_static! {
    static ref SEL_SECTION: Selector = sel("div.force-left-full-width[id]");
    static ref SEL_CATEGORY_HEADING: Selector = sel(".cat-heading-box .category-heading h2");
    static ref SEL_ANY_HEADING: Selector = sel("h2");
    static ref SEL_CARD: Selector = sel("section.recipe-card");
    static ref SEL_ITEM_NAME: Selector = sel(".menu-item-title .ucla-prose h3");
}

/// Why a meal period produced no menu
#[derive(thiserror::Error, Debug)]
pub enum MenuMiss {
    #[error("anchor #{0} not found")]
    AnchorNotFound(String),
    #[error("no content container after anchor #{0}")]
    NoContainer(String),
    #[error("no sub-category sections in content")]
    NoSubCategories,
    #[error(transparent)]
    Scrape(#[from] ScrapeError),
}

impl MenuMiss {
    /// A missing anchor just means the period isn't served. Anything else means the page has
    /// the period, but we failed to read it.
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::AnchorNotFound(_))
    }
}

/// Ways of finding the sub-category sections, in the order they're tried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionStage {
    /// Sections whose id starts with the lower case period label, e.g. "dinner-grill"
    PeriodPrefixed,
    /// Any section with an id
    AnyId,
}

impl SectionStage {
    pub const ORDER: [SectionStage; 2] = [Self::PeriodPrefixed, Self::AnyId];

    pub fn attempt<'a>(&self, fragment: &'a Html, period: MealPeriod) -> Option<Vec<ElementRef<'a>>> {
        let prefix = period.label().to_lowercase();
        let found: Vec<ElementRef> = fragment
            .select(&SEL_SECTION)
            .filter(|e| match self {
                Self::PeriodPrefixed => e.attr("id").is_some_and(|id| id.starts_with(&prefix)),
                Self::AnyId => true,
            })
            .collect();
        if found.is_empty() { None } else { Some(found) }
    }
}

pub fn find_sections<'a>(
    fragment: &'a Html,
    period: MealPeriod,
) -> Option<(SectionStage, Vec<ElementRef<'a>>)> {
    SectionStage::ORDER.iter().find_map(|stage| {
        let found = stage.attempt(fragment, period);
        if found.is_none() {
            debug!(%period, ?stage, "No sub-category sections found at this stage");
        }
        found.map(|v| (*stage, v))
    })
}

/// Ways of finding a section's display name, in the order they're tried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameStage {
    /// The h2 within the dedicated heading box
    CategoryHeading,
    /// Any h2 within the section
    AnyHeading,
}

impl NameStage {
    pub const ORDER: [NameStage; 2] = [Self::CategoryHeading, Self::AnyHeading];

    pub fn attempt(&self, section: &ElementRef) -> Option<String> {
        let sel: &Selector = match self {
            Self::CategoryHeading => &SEL_CATEGORY_HEADING,
            Self::AnyHeading => &SEL_ANY_HEADING,
        };
        get_text(section, sel).filter(|t| !t.is_empty())
    }
}

/// Name from the section headings, or the placeholder if there are none
pub fn heading_name(section: &ElementRef) -> String {
    NameStage::ORDER
        .iter()
        .find_map(|stage| stage.attempt(section))
        .unwrap_or_else(|| UNKNOWN_CATEGORY.into())
}

/// Some sections repeat the period name as their heading. For those, derive the name from the
/// section id instead: "breakfast-hot-cereals" gives "Hot Cereals".
/// Returns None when the heading name is fine as is, or the id can't be used.
pub fn name_from_id(heading: &str, section_id: &str, period: MealPeriod) -> Option<String> {
    if !heading.eq_ignore_ascii_case(period.label()) {
        return None;
    }
    let prefix = format!("{}-", period.label().to_lowercase());
    section_id
        .strip_prefix(&prefix)
        .map(|rest| title_case(&rest.replace('-', " ")))
}

pub fn category_name(section: &ElementRef, period: MealPeriod) -> String {
    let name = heading_name(section);
    match name_from_id(&name, section.attr("id").unwrap_or_default(), period) {
        Some(n) => {
            trace!(%period, heading = %name, name = %n, "Heading repeats the period, using section id");
            n
        }
        None => name,
    }
}

/// Names of all recipe cards in the section, in page order. Cards without a readable name are
/// skipped.
pub fn extract_items(section: &ElementRef, category: &str) -> Vec<String> {
    let mut items = Vec::new();
    for card in section.select(&SEL_CARD) {
        match get_text(&card, &SEL_ITEM_NAME).filter(|n| !n.is_empty()) {
            Some(name) => items.push(name),
            None => warn!(category, "Could not find item name in a recipe card"),
        }
    }
    if items.is_empty() {
        debug!(category, "No recipe cards found");
    }
    items
}

/// Segment the markup of a meal period's content container into named sub-categories
pub fn parse_period_fragment(fragment: &str, period: MealPeriod) -> Result<PeriodMenu, MenuMiss> {
    let html = Html::parse_fragment(fragment);
    let (stage, sections) = find_sections(&html, period).ok_or(MenuMiss::NoSubCategories)?;
    trace!(%period, ?stage, count = sections.len(), "Found sub-category sections");

    let mut menu = PeriodMenu::default();
    for section in sections {
        let name = category_name(&section, period);
        let items = extract_items(&section, &name);
        menu.insert(Category { name, items });
    }
    Ok(menu)
}

/// Locate the anchor for one meal period, and parse the content container that follows it
pub fn extract_period(doc: &Html, anchor: &PeriodAnchor) -> Result<PeriodMenu, MenuMiss> {
    let anchor_sel = try_sel(&format!("[id=\"{}\"]", anchor.anchor))?;
    let anchor_elem = doc
        .select(&anchor_sel)
        .next()
        .ok_or_else(|| MenuMiss::AnchorNotFound(anchor.anchor.to_string()))?;

    let container = anchor_elem
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == "div")
        .ok_or_else(|| MenuMiss::NoContainer(anchor.anchor.to_string()))?;

    parse_period_fragment(&container.html(), anchor.period)
}

/// Extract every configured meal period from a location page.
/// A failing period is logged and left out, it never stops the other periods.
pub fn extract_location(doc: &Html, anchors: &[PeriodAnchor], location: &str) -> LocationMenu {
    let mut menu = LocationMenu::default();
    let mut failures = 0;

    for a in anchors {
        trace!(location, period = %a.period, anchor = %a.anchor, "Processing meal period...");
        match extract_period(doc, a) {
            Ok(pm) => menu.add(a.period, pm),
            // the period is on the page, just without anything in it yet
            Err(MenuMiss::NoSubCategories) => {
                warn!(location, period = %a.period, "Meal period has no sub-categories");
                menu.add(a.period, PeriodMenu::default());
            }
            Err(e) if e.is_absent() => {
                debug!(location, period = %a.period, err = %e, "Could not find meals for period");
            }
            Err(e) => {
                failures += 1;
                warn!(location, period = %a.period, err = %e, "Failed to extract meal period");
            }
        }
    }

    menu.status = if !menu.is_empty() {
        LocationStatus::Ok
    } else if failures > 0 {
        LocationStatus::ParseFailure
    } else {
        LocationStatus::Closed
    };
    if menu.is_empty() {
        warn!(location, status = ?menu.status, "Location is either closed or failed to parse");
    }
    menu
}
