//! Plain-text and markdown artifacts. Writers format and write, nothing
//! else; missing directories and other I/O failures propagate to the
//! caller unchanged.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::Result;

use crate::extract::events::EventRow;

/// Enumerated date list: fixed header, blank line, then `n) date`
/// 1-indexed.
pub fn write_dates(path: &Path, dates: &[String]) -> Result<()> {
    let mut out = String::from("DATES ON PAGE:\n\n");
    for (i, date) in dates.iter().enumerate() {
        let _ = writeln!(out, "{}) {}", i + 1, date);
    }
    fs::write(path, out)?;
    Ok(())
}

/// Full link inventory followed by the Wikipedia-article subset.
pub fn write_urls(path: &Path, all: &[String], articles: &[String]) -> Result<()> {
    let mut out = String::from("ALL URLS:\n");
    for url in all {
        let _ = writeln!(out, "{url}");
    }
    out.push_str("\nWIKIPEDIA ARTICLES:\n");
    for url in articles {
        let _ = writeln!(out, "{url}");
    }
    fs::write(path, out)?;
    Ok(())
}

/// Empty betting slip for a season schedule: legend plus one markdown
/// table row per event, with the wager column left blank.
pub fn write_betting_slip(path: &Path, events: &[EventRow]) -> Result<()> {
    let mut out = String::from("BETTING SLIP\n\nName:\n\n");
    out.push_str(
        "Event Key: DH – Downhill, SL – Slalom, GS – Giant Slalom, \
         SG – Super Giant Slalom, AC – Alpine Combined, PG – Parallel Giant Slalom\n\n",
    );
    out.push_str("| **DATE** | **VENUE** | **DISCIPLINE** | **Who wins?** |\n");
    out.push_str("| --- | --- | --- | --- |\n");
    for event in events {
        let _ = writeln!(
            out,
            "| {} | {} | {} |  |",
            event.date, event.venue, event.discipline
        );
    }
    fs::write(path, out)?;
    Ok(())
}

/// Raw dump of a fetched page: final URL, then the body.
pub fn write_page_dump(path: &Path, url: &str, body: &str) -> Result<()> {
    fs::write(path, format!("URL: {url}\nTEXT:\n{body}"))?;
    Ok(())
}
