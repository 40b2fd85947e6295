//! Season schedule extraction from a Wikipedia event calendar table
//! (FIS Alpine Ski World Cup shape).

use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;
use tracing::warn;

use crate::html;

static EVENT_DATE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{1,2} \w+ \d{4}").unwrap());
// Discipline cell: a two-letter event code followed by a running number,
// possibly with cancellation markers ("DH090", "SL101cnx").
static DISCIPLINE_CODE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Z]{2}[\dcnx]{3}").unwrap());
static CODE_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\dcnx]{3}").unwrap());
static FILLER_CELL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d*$").unwrap());

#[derive(Debug, Clone, PartialEq)]
pub struct EventRow {
    pub date: String,
    pub venue: String,
    pub discipline: String,
}

/// Pull (date, venue, discipline) rows out of the first schedule table.
///
/// The calendar rows carry leading row-number/event-number cells and trail
/// winner/runner-up columns after the discipline; both are cut away. Venue
/// cells are rowspanned across multi-event weekends, so a row reduced to
/// two cells inherits the venue of the row above it.
pub fn extract_schedule(page: &str) -> Result<Vec<EventRow>> {
    let table = html::table_block(page, &["wikitable plainrowheaders"])
        .context("no schedule table on page")?;

    let mut events: Vec<EventRow> = Vec::new();
    for row in html::rows(table) {
        let mut cells = html::data_cells(row);
        if cells.len() < 2 {
            // header or filler row
            continue;
        }
        cells.truncate(5);

        while cells.first().is_some_and(|c| FILLER_CELL_RE.is_match(c)) {
            cells.remove(0);
        }
        if let Some(idx) = cells.iter().position(|c| DISCIPLINE_CODE_RE.is_match(c)) {
            cells.truncate(idx + 1);
        }
        if cells.len() == 2 {
            if let Some(prev) = events.last() {
                cells.insert(1, prev.venue.clone());
            }
        }
        if cells.len() != 3 {
            warn!("skipping schedule row with {} usable cells", cells.len());
            continue;
        }

        let Some(date) = EVENT_DATE_RE.find(&cells[0]) else {
            warn!("skipping schedule row without a date: {:?}", cells[0]);
            continue;
        };
        let discipline = CODE_SUFFIX_RE.replace_all(&cells[2], "").trim().to_string();

        events.push(EventRow {
            date: date.as_str().to_string(),
            venue: cells[1].clone(),
            discipline,
        });
    }

    Ok(events)
}
