// Fixed configuration for both pipelines. The defaults mirror the live site; tests and the CLI
// construct smaller or redirected variants and hand them to the runner.

use crate::models::MealPeriod;
use chrono::{Datelike, Local};
use compact_str::CompactString;
use serde::Serialize;
use std::time::Duration;
use url::Url;

pub static DEFAULT_BASE_URL: &str = "https://dining.ucla.edu/";
pub static DEFAULT_SCHEDULE_PATH: &str = "meal-swipe-exchange/";

/// (slug, display name), in the order they're scraped
static DINING_LOCATIONS: &[(&str, &str)] = &[
    ("bruin-plate", "Bruin Plate"),
    ("de-neve-dining", "De Neve"),
    ("epicuria-at-covel", "Epicuria"),
    ("bruin-cafe", "Bruin Cafe"),
    ("cafe-1919", "Cafe 1919"),
    ("epicuria-at-ackerman", "Epic at Ackerman"),
    ("rendezvous", "Rendezvous"),
    ("the-drey", "The Drey"),
    ("the-study-at-hedrick", "The Study at Hedrick"),
    ("spice-kitchen", "Spice Kitchen at Bruin Bowl"),
];

/// (heading text on the page, tag used in output keys)
static SCHEDULE_LOCATIONS: &[(&str, &str)] = &[("Sproul", "SPROUL"), ("Rieber", "RIEBER")];

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct DiningLocation {
    pub slug: CompactString,
    pub name: CompactString,
}

impl DiningLocation {
    pub fn new(slug: &str, name: &str) -> Self {
        Self {
            slug: slug.into(),
            name: name.into(),
        }
    }

    /// All locations we know about
    pub fn defaults() -> Vec<Self> {
        DINING_LOCATIONS
            .iter()
            .map(|(slug, name)| Self::new(slug, name))
            .collect()
    }

    /// Look up a known location by slug. Unknown slugs get the slug as name.
    pub fn from_slug(slug: &str) -> Self {
        DINING_LOCATIONS
            .iter()
            .find(|(s, _)| *s == slug)
            .map(|(s, n)| Self::new(s, n))
            .unwrap_or_else(|| Self::new(slug, slug))
    }
}

/// Ties a meal period to the id of the element its content follows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodAnchor {
    pub anchor: CompactString,
    pub period: MealPeriod,
}

impl PeriodAnchor {
    pub fn new(anchor: &str, period: MealPeriod) -> Self {
        Self {
            anchor: anchor.into(),
            period,
        }
    }

    pub fn defaults() -> Vec<Self> {
        MealPeriod::ALL
            .iter()
            .map(|p| Self::new(p.default_anchor(), *p))
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct MenuConfig {
    /// Location pages are `{base_url}{slug}/`
    pub base_url: Url,
    pub locations: Vec<DiningLocation>,
    pub anchors: Vec<PeriodAnchor>,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            locations: DiningLocation::defaults(),
            anchors: PeriodAnchor::defaults(),
        }
    }
}

impl MenuConfig {
    pub fn location_url(&self, location: &DiningLocation) -> Result<Url, url::ParseError> {
        self.base_url.join(&format!("{}/", location.slug))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleLocation {
    pub heading: CompactString,
    pub tag: CompactString,
}

impl ScheduleLocation {
    pub fn new(heading: &str, tag: &str) -> Self {
        Self {
            heading: heading.into(),
            tag: tag.into(),
        }
    }

    pub fn defaults() -> Vec<Self> {
        SCHEDULE_LOCATIONS
            .iter()
            .map(|(h, t)| Self::new(h, t))
            .collect()
    }
}

/// What to do with a schedule row that can't be read or normalized
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RowPolicy {
    /// Fail the whole schedule run
    #[default]
    Abort,
    /// Log the row and carry on with the next one
    Skip,
}

#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    pub url: Url,
    pub locations: Vec<ScheduleLocation>,
    /// Year to combine with the "Weekday, Month Day" dates in the table
    pub year: i32,
    /// How long to keep polling for the schedule tables to show up
    pub table_wait: Duration,
    pub poll_interval: Duration,
    pub row_policy: RowPolicy,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            url: default_schedule_url(),
            locations: ScheduleLocation::defaults(),
            year: Local::now().year(),
            table_wait: Duration::from_secs(10),
            poll_interval: Duration::from_millis(500),
            row_policy: RowPolicy::default(),
        }
    }
}

fn default_base_url() -> Url {
    // constant input, can't fail
    Url::parse(DEFAULT_BASE_URL).unwrap()
}

fn default_schedule_url() -> Url {
    default_base_url().join(DEFAULT_SCHEDULE_PATH).unwrap()
}
