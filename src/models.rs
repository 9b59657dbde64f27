// Records produced by the menu and schedule pipelines.
// Everything here lives for a single run only. Menu records keep insertion order, since that's
// the order items appear on the page, and that's what the output JSON should show.

use chrono::NaiveDate;
use compact_str::CompactString;
use serde::{Serialize, Serializer};
use std::{collections::BTreeMap, fmt::Display};

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MealPeriod {
    Breakfast,
    Lunch,
    Dinner,
}

impl MealPeriod {
    pub const ALL: [MealPeriod; 3] = [Self::Breakfast, Self::Lunch, Self::Dinner];

    /// Upper case label, as used for output keys and heading comparison
    pub fn label(&self) -> &'static str {
        match self {
            Self::Breakfast => "BREAKFAST",
            Self::Lunch => "LUNCH",
            Self::Dinner => "DINNER",
        }
    }

    /// Id of the element preceding this period's content on a location page
    pub fn default_anchor(&self) -> &'static str {
        match self {
            Self::Breakfast => "breakfastmenu",
            Self::Lunch => "lunchmenu",
            Self::Dinner => "dinnermenu",
        }
    }
}

impl Display for MealPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// What we could tell about a location after scraping it
#[derive(Debug, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LocationStatus {
    /// At least one meal period was found on the page
    Ok,
    /// The page loaded, but had none of the meal period anchors
    #[default]
    Closed,
    /// Something was there, but could not be turned into data
    ParseFailure,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Category {
    pub name: String,
    pub items: Vec<String>,
}

impl Category {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Sub-categories of one meal period, in page order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PeriodMenu {
    pub categories: Vec<Category>,
}

impl PeriodMenu {
    /// Add a category. If one with the same name exists, its items are replaced, but it keeps its
    /// position.
    pub fn insert(&mut self, category: Category) {
        match self.categories.iter_mut().find(|c| c.name == category.name) {
            Some(existing) => existing.items = category.items,
            None => self.categories.push(category),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Vec<String>> {
        self.categories
            .iter()
            .find(|c| c.name == name)
            .map(|c| &c.items)
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

impl Serialize for PeriodMenu {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_map(self.categories.iter().map(|c| (&c.name, &c.items)))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationMenu {
    pub status: LocationStatus,
    pub periods: Vec<(MealPeriod, PeriodMenu)>,
}

impl LocationMenu {
    pub fn add(&mut self, period: MealPeriod, menu: PeriodMenu) {
        match self.periods.iter_mut().find(|(p, _)| *p == period) {
            Some((_, existing)) => *existing = menu,
            None => self.periods.push((period, menu)),
        }
    }

    pub fn get(&self, period: MealPeriod) -> Option<&PeriodMenu> {
        self.periods
            .iter()
            .find(|(p, _)| *p == period)
            .map(|(_, m)| m)
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }
}

// Status is not part of the output shape
impl Serialize for LocationMenu {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_map(self.periods.iter().map(|(p, m)| (p, m)))
    }
}

/// Menus for all configured locations, keyed by location slug
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MenuRecord {
    pub locations: Vec<(CompactString, LocationMenu)>,
}

impl MenuRecord {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn add(&mut self, slug: &str, menu: LocationMenu) {
        match self.locations.iter_mut().find(|(s, _)| s.as_str() == slug) {
            Some((_, existing)) => *existing = menu,
            None => self.locations.push((slug.into(), menu)),
        }
    }

    pub fn get(&self, slug: &str) -> Option<&LocationMenu> {
        self.locations
            .iter()
            .find(|(s, _)| s.as_str() == slug)
            .map(|(_, m)| m)
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

impl Serialize for MenuRecord {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_map(self.locations.iter().map(|(l, m)| (l, m)))
    }
}

/// The two evening windows of the food truck schedule
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScheduleSlot {
    Dinner,
    LateNight,
}

impl ScheduleSlot {
    /// In table column order
    pub const ALL: [ScheduleSlot; 2] = [Self::Dinner, Self::LateNight];

    pub fn tag(&self) -> &'static str {
        match self {
            Self::Dinner => "DINNER",
            Self::LateNight => "LATE_NIGHT",
        }
    }

    /// Column header on the schedule page
    pub fn window(&self) -> &'static str {
        match self {
            Self::Dinner => "5–8:30pm",
            Self::LateNight => "9–12am",
        }
    }
}

impl Display for ScheduleSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// One table row, as read from the page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawScheduleEntry {
    /// E.g. "Sun, June 8"
    pub date: String,
    /// Cell text per slot, in `ScheduleSlot::ALL` order
    pub slots: [String; 2],
}

impl RawScheduleEntry {
    pub fn new(date: &str, dinner: &str, late_night: &str) -> Self {
        Self {
            date: date.into(),
            slots: [dinner.into(), late_night.into()],
        }
    }

    pub fn slot(&self, slot: ScheduleSlot) -> &str {
        match slot {
            ScheduleSlot::Dinner => &self.slots[0],
            ScheduleSlot::LateNight => &self.slots[1],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScheduleKey {
    pub date: NaiveDate,
    pub location: CompactString,
    pub slot: ScheduleSlot,
}

impl Display for ScheduleKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}-{}-{}",
            self.date.format("%Y-%m-%d"),
            self.location,
            self.slot
        )
    }
}

impl Serialize for ScheduleKey {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

#[derive(Debug, Serialize, Clone, Default, PartialEq)]
pub struct TruckList {
    #[serde(rename = "truck-names")]
    pub truck_names: Vec<String>,
}

/// Normalized schedule for all locations. Inserting an existing key replaces its trucks.
#[derive(Debug, Serialize, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct ScheduleRecord(pub BTreeMap<ScheduleKey, TruckList>);

impl ScheduleRecord {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn insert(&mut self, key: ScheduleKey, trucks: Vec<String>) -> Option<TruckList> {
        self.0.insert(
            key,
            TruckList {
                truck_names: trucks,
            },
        )
    }

    /// Look up by the rendered key, e.g. "2025-06-08-SPROUL-DINNER"
    pub fn get(&self, key: &str) -> Option<&Vec<String>> {
        self.0
            .iter()
            .find(|(k, _)| k.to_string() == key)
            .map(|(_, v)| &v.truck_names)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
