// Food truck schedule extraction.
//
// The schedule page has one table per location, each inside a <figure> following an <h3> with the
// location name. Every body row is "date | 5–8:30pm | 9–12am", where the slot cells may list
// several trucks, one per line.

use crate::{
    config::{RowPolicy, ScheduleLocation},
    error::ScrapeError,
    models::{RawScheduleEntry, ScheduleKey, ScheduleRecord, ScheduleSlot},
    util::*,
};
use chrono::NaiveDate;
use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, trace, warn};

/// Present on every schedule table, used to tell when the page is ready
pub static TABLE_MARKER: &str = "table.ucla-table__border";
const CELLS_PER_ROW: usize = 3;

lazy_static! {
    static ref SEL_HEADING: Selector = sel("h3");
    static ref SEL_TABLE: Selector = sel("table");
    static ref SEL_BODY_ROW: Selector = sel("tbody > tr");
}

/// The first table inside a `figure` following the `h3` whose text is `heading`
pub fn find_table<'a>(doc: &'a Html, heading: &str) -> Result<ElementRef<'a>, ScrapeError> {
    doc.select(&SEL_HEADING)
        .filter(|h| reduce_whitespace(&h.text().collect::<String>()) == heading)
        .find_map(|h| {
            h.next_siblings()
                .filter_map(ElementRef::wrap)
                .filter(|e| e.value().name() == "figure")
                .find_map(|f| f.select(&SEL_TABLE).next())
        })
        .ok_or_else(|| ScrapeError::not_found(format!("schedule table for {heading}")))
}

fn parse_row(row: &ElementRef, index: usize) -> Result<RawScheduleEntry, ScrapeError> {
    let cells: Vec<ElementRef> = row
        .child_elements()
        .filter(|c| c.value().name() == "td")
        .collect();
    if cells.len() < CELLS_PER_ROW {
        return Err(ScrapeError::MalformedRow {
            row: index,
            cells: cells.len(),
            expected: CELLS_PER_ROW,
        });
    }
    Ok(RawScheduleEntry {
        date: rendered_text(&cells[0]),
        slots: [rendered_text(&cells[1]), rendered_text(&cells[2])],
    })
}

/// Read all body rows of a schedule table. Header rows are not part of the body, and are skipped.
pub fn parse_table(table: &ElementRef, policy: RowPolicy) -> Result<Vec<RawScheduleEntry>, ScrapeError> {
    let mut out = Vec::new();
    for (i, row) in table.select(&SEL_BODY_ROW).enumerate() {
        match parse_row(&row, i + 1) {
            Ok(entry) => out.push(entry),
            Err(e) if policy == RowPolicy::Skip => {
                warn!(err = %e, "Skipping schedule row");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(out)
}

/// Locate and read the table of every location, in the given order.
/// All tables are required: a missing one fails the whole extraction.
pub fn extract_tables(
    doc: &Html,
    locations: &[ScheduleLocation],
    policy: RowPolicy,
) -> Result<Vec<Vec<RawScheduleEntry>>, ScrapeError> {
    locations
        .iter()
        .map(|loc| {
            let table = find_table(doc, &loc.heading)?;
            let rows = parse_table(&table, policy)?;
            debug!(location = %loc.tag, rows = rows.len(), "Read schedule table");
            Ok(rows)
        })
        .collect()
}

/// Parse e.g. "Sun, June 8" in the given year. Everything up to the first comma is ignored.
/// Abbreviated months ("Jun 8") are accepted as well.
pub fn parse_date(raw: &str, year: i32) -> Result<NaiveDate, ScrapeError> {
    let bad = |source: Option<chrono::ParseError>| ScrapeError::BadDate {
        input: raw.into(),
        source,
    };
    let (_, month_day) = raw.split_once(',').ok_or_else(|| bad(None))?;
    NaiveDate::parse_from_str(&format!("{} {year}", month_day.trim()), "%B %d %Y")
        .map_err(|e| bad(Some(e)))
}

/// One truck per line. Returns None for a blank cell.
pub fn split_trucks(raw: &str) -> Option<Vec<String>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    Some(
        raw.split('\n')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect(),
    )
}

/// Normalize the rows of one location into `out`. Keys are qualified by `location`, so several
/// locations can share the same record. An existing key gets its trucks replaced.
/// Returns the number of keys written.
pub fn normalize(
    entries: &[RawScheduleEntry],
    location: &str,
    year: i32,
    policy: RowPolicy,
    out: &mut ScheduleRecord,
) -> Result<usize, ScrapeError> {
    let mut written = 0;
    for entry in entries {
        let date = match parse_date(&entry.date, year) {
            Ok(d) => d,
            Err(e) if policy == RowPolicy::Skip => {
                warn!(location, err = %e, "Skipping schedule entry");
                continue;
            }
            Err(e) => return Err(e),
        };

        for slot in ScheduleSlot::ALL {
            let Some(trucks) = split_trucks(entry.slot(slot)) else {
                continue;
            };
            let key = ScheduleKey {
                date,
                location: location.into(),
                slot,
            };
            trace!(%key, window = slot.window(), ?trucks, "Adding schedule entry");
            if out.insert(key, trucks).is_some() {
                debug!(location, %date, %slot, "Replaced existing schedule entry");
            }
            written += 1;
        }
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule_page() -> String {
        r#"<html><body>
        <h3>Sproul</h3>
        <p>Trucks at Sproul Turnaround</p>
        <figure class="wp-block-table"><table class="ucla-table__border">
          <thead><tr><th>Date</th><th>5–8:30pm</th><th>9–12am</th></tr></thead>
          <tbody>
            <tr><td>Sun, June 8</td><td>Salpicon<br>BittieBitez<br></td><td></td></tr>
            <tr><td>Mon, June 9</td><td>Perro 1-10 Tacos</td><td>Dina's Dumpling</td></tr>
          </tbody>
        </table></figure>
        <h3> Rieber </h3>
        <figure class="wp-block-table"><table class="ucla-table__border">
          <thead><tr><th>Date</th><th>5–8:30pm</th><th>9–12am</th></tr></thead>
          <tbody>
            <tr><td>Sun, June 8</td><td>  </td><td>Smile Hotdog</td></tr>
          </tbody>
        </table></figure>
        </body></html>"#
            .into()
    }

    #[test]
    fn date_normalization() {
        assert_eq!(
            NaiveDate::from_ymd_opt(2025, 6, 8).unwrap(),
            parse_date("Sun, June 8", 2025).unwrap()
        );
        assert_eq!(
            "2025-06-08",
            parse_date("Sun, June 8", 2025).unwrap().to_string()
        );
        assert_eq!(
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            parse_date("Tue,December 31", 2024).unwrap()
        );
    }

    #[test]
    fn bad_dates() {
        assert!(matches!(
            parse_date("June 8", 2025),
            Err(ScrapeError::BadDate { source: None, .. })
        ));
        assert!(matches!(
            parse_date("Sun, Juneteenth", 2025),
            Err(ScrapeError::BadDate {
                source: Some(_),
                ..
            })
        ));
        // abbreviated month names are accepted too
        assert_eq!(
            NaiveDate::from_ymd_opt(2025, 6, 8).unwrap(),
            parse_date("Sun, Jun 8", 2025).unwrap()
        );
        // no such day that year
        assert!(parse_date("Sat, February 29", 2025).is_err());
    }

    #[test]
    fn truck_splitting() {
        assert_eq!(
            Some(vec!["Salpicon".to_string(), "BittieBitez".to_string()]),
            split_trucks("Salpicon\nBittieBitez")
        );
        assert_eq!(
            Some(vec!["Salpicon".to_string(), "BittieBitez".to_string()]),
            split_trucks("  Salpicon \r\n\n BittieBitez\n\n\n")
        );
        assert_eq!(None, split_trucks(" \n \t"));
        assert_eq!(None, split_trucks(""));
    }

    #[test]
    fn normalize_skips_blank_slots() {
        let mut out = ScheduleRecord::new();
        let n = normalize(
            &[RawScheduleEntry::new("Sun, June 8", "Salpicon\nBittieBitez\n", "  ")],
            "SPROUL",
            2025,
            RowPolicy::Abort,
            &mut out,
        )
        .unwrap();
        assert_eq!(1, n);
        assert_eq!(
            Some(&vec!["Salpicon".to_string(), "BittieBitez".to_string()]),
            out.get("2025-06-08-SPROUL-DINNER")
        );
        assert!(out.get("2025-06-08-SPROUL-LATE_NIGHT").is_none());
    }

    #[test]
    fn normalize_last_write_wins() {
        let mut out = ScheduleRecord::new();
        normalize(
            &[
                RawScheduleEntry::new("Sun, June 8", "Salpicon\nBittieBitez", ""),
                RawScheduleEntry::new("Sunday, June 8", "Kogi", ""),
            ],
            "RIEBER",
            2025,
            RowPolicy::Abort,
            &mut out,
        )
        .unwrap();
        assert_eq!(1, out.len());
        assert_eq!(
            Some(&vec!["Kogi".to_string()]),
            out.get("2025-06-08-RIEBER-DINNER")
        );
    }

    #[test]
    fn normalize_shared_record_keeps_locations_apart() {
        let mut out = ScheduleRecord::new();
        let rows = [RawScheduleEntry::new("Sun, June 8", "A", "B")];
        normalize(&rows, "SPROUL", 2025, RowPolicy::Abort, &mut out).unwrap();
        normalize(&rows, "RIEBER", 2025, RowPolicy::Abort, &mut out).unwrap();
        assert_eq!(4, out.len());
        assert!(out.get("2025-06-08-SPROUL-LATE_NIGHT").is_some());
        assert!(out.get("2025-06-08-RIEBER-DINNER").is_some());
    }

    #[test]
    fn normalize_bad_date_policy() {
        let rows = [
            RawScheduleEntry::new("TBD", "A", ""),
            RawScheduleEntry::new("Mon, June 9", "B", ""),
        ];
        let mut out = ScheduleRecord::new();
        assert!(normalize(&rows, "SPROUL", 2025, RowPolicy::Abort, &mut out).is_err());

        let mut out = ScheduleRecord::new();
        let n = normalize(&rows, "SPROUL", 2025, RowPolicy::Skip, &mut out).unwrap();
        assert_eq!(1, n);
        assert!(out.get("2025-06-09-SPROUL-DINNER").is_some());
    }

    #[test]
    fn tables_by_heading() {
        let doc = Html::parse_document(&schedule_page());
        let rows = parse_table(&find_table(&doc, "Rieber").unwrap(), RowPolicy::Abort).unwrap();
        assert_eq!(vec![RawScheduleEntry::new("Sun, June 8", "", "Smile Hotdog")], rows);

        let rows = parse_table(&find_table(&doc, "Sproul").unwrap(), RowPolicy::Abort).unwrap();
        assert_eq!(2, rows.len());
        assert_eq!(
            RawScheduleEntry::new("Sun, June 8", "Salpicon\nBittieBitez", ""),
            rows[0]
        );

        assert!(matches!(
            find_table(&doc, "Hill"),
            Err(ScrapeError::NotFound(_))
        ));
    }

    #[test]
    fn table_must_follow_heading() {
        let doc = Html::parse_document(
            r#"<html><body><figure><table><tbody><tr><td>a</td></tr></tbody></table></figure><h3>Sproul</h3></body></html>"#,
        );
        assert!(find_table(&doc, "Sproul").is_err());
    }

    #[test]
    fn short_rows() {
        let doc = Html::parse_document(
            r#"<html><body><h3>Sproul</h3><figure><table>
            <tbody><tr><td>Sun, June 8</td><td>A</td><td>B</td></tr><tr><td>Closed</td></tr></tbody>
            </table></figure></body></html>"#,
        );
        let table = find_table(&doc, "Sproul").unwrap();
        let err = parse_table(&table, RowPolicy::Abort).unwrap_err();
        assert!(matches!(
            err,
            ScrapeError::MalformedRow {
                row: 2,
                cells: 1,
                ..
            }
        ));
        assert_eq!(1, parse_table(&table, RowPolicy::Skip).unwrap().len());
    }

    #[test]
    fn extract_and_normalize_page() {
        let doc = Html::parse_document(&schedule_page());
        let locations = ScheduleLocation::defaults();
        let tables = extract_tables(&doc, &locations, RowPolicy::Abort).unwrap();
        let mut out = ScheduleRecord::new();
        for (loc, rows) in locations.iter().zip(tables.iter()) {
            normalize(rows, &loc.tag, 2025, RowPolicy::Abort, &mut out).unwrap();
        }
        assert_eq!(
            serde_json::json!({
                "2025-06-08-SPROUL-DINNER": {"truck-names": ["Salpicon", "BittieBitez"]},
                "2025-06-09-SPROUL-DINNER": {"truck-names": ["Perro 1-10 Tacos"]},
                "2025-06-09-SPROUL-LATE_NIGHT": {"truck-names": ["Dina's Dumpling"]},
                "2025-06-08-RIEBER-LATE_NIGHT": {"truck-names": ["Smile Hotdog"]},
            }),
            serde_json::to_value(&out).unwrap()
        );
    }

    #[test]
    fn missing_location_table_fails_extraction() {
        let doc = Html::parse_document(&schedule_page());
        let locations = vec![
            ScheduleLocation::new("Sproul", "SPROUL"),
            ScheduleLocation::new("De Neve", "DENEVE"),
        ];
        assert!(extract_tables(&doc, &locations, RowPolicy::Skip).is_err());
    }
}
