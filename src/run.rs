use crate::{
    config::{DiningLocation, MenuConfig, ScheduleConfig},
    menu,
    models::{LocationMenu, LocationStatus, MenuRecord, ScheduleRecord},
    page::{PageSource, wait_for},
    schedule::{self, TABLE_MARKER},
};
use anyhow::{Context, Result};
use scraper::Html;
use std::time::Instant;
use tracing::{debug, error, info};

/// Drives both pipelines, one page at a time
pub struct Runner<S> {
    source: S,
    menu: MenuConfig,
    schedule: ScheduleConfig,
}

impl<S: PageSource> Runner<S> {
    pub fn new(source: S, menu: MenuConfig, schedule: ScheduleConfig) -> Self {
        Self {
            source,
            menu,
            schedule,
        }
    }

    /// Scrape every configured location. Never fails: a location that can't be scraped is logged
    /// and shows up with an empty menu.
    pub async fn menus(&self) -> MenuRecord {
        let start = Instant::now();
        let mut record = MenuRecord::new();

        for loc in &self.menu.locations {
            let menu = match self.location_menu(loc).await {
                Ok(m) => m,
                Err(e) => {
                    error!(location = %loc.slug, err = ?e, "Failed to scrape location");
                    LocationMenu {
                        status: LocationStatus::ParseFailure,
                        ..Default::default()
                    }
                }
            };
            debug!(location = %loc.slug, status = ?menu.status, periods = menu.periods.len(), "Location done");
            record.add(&loc.slug, menu);
        }

        info!(locations = record.len(), elapsed = ?start.elapsed(), "Menu scrape done");
        record
    }

    async fn location_menu(&self, loc: &DiningLocation) -> Result<LocationMenu> {
        let url = self
            .menu
            .location_url(loc)
            .with_context(|| format!("invalid url for location {}", loc.slug))?;
        info!(location = %loc.slug, name = %loc.name, %url, "Scraping location...");

        let body = self
            .source
            .fetch(&url)
            .await
            .with_context(|| format!("failed to fetch {url}"))?;
        let doc = Html::parse_document(&body);
        Ok(menu::extract_location(&doc, &self.menu.anchors, &loc.slug))
    }

    /// Scrape the food truck schedule for all configured schedule locations into one record.
    /// Any missing table or unreadable row (unless rows are configured to be skipped) fails the
    /// whole run.
    pub async fn schedule(&self) -> Result<ScheduleRecord> {
        let cfg = &self.schedule;
        let start = Instant::now();
        info!(url = %cfg.url, year = cfg.year, "Scraping food truck schedule...");

        let body = wait_for(
            &self.source,
            &cfg.url,
            TABLE_MARKER,
            cfg.table_wait,
            cfg.poll_interval,
        )
        .await
        .context("no schedule table on page")?;

        let tables = {
            let doc = Html::parse_document(&body);
            schedule::extract_tables(&doc, &cfg.locations, cfg.row_policy).inspect_err(|e| {
                if e.is_miss() {
                    error!(err = %e, "Schedule page layout has changed");
                } else {
                    error!(err = %e, "Unreadable schedule table");
                }
            })?
        };

        let mut out = ScheduleRecord::new();
        for (loc, rows) in cfg.locations.iter().zip(tables.iter()) {
            let n = schedule::normalize(rows, &loc.tag, cfg.year, cfg.row_policy, &mut out)
                .with_context(|| format!("failed to normalize schedule for {}", loc.heading))?;
            debug!(location = %loc.tag, entries = n, "Normalized schedule");
        }

        info!(entries = out.len(), elapsed = ?start.elapsed(), "Schedule scrape done");
        Ok(out)
    }
}
