//! Date harvesting over raw page text.
//!
//! Four grammars are tried in a fixed order (day-month-year, month-day-year,
//! year-month-day, dashed ISO) and every hit is normalized to `YYYY/MM` or
//! `YYYY/MM/DD`. Textual months are matched by letter shape first and only
//! resolved against the month table afterwards, so shape-only lookalikes are
//! dropped during normalization rather than parsed.

use std::sync::LazyLock;

use regex::Regex;

// Years are 2-4 digits with small numbers excluded: 100-9999, 40-99, 32-39.
// Two-digit years are kept verbatim in the output; no century is inferred.
const YEAR: &str = r"[1-9]\d{2,3}|[4-9]\d|3[2-9]";
const DAY: &str = r"[1-9]|[12]\d|3[01]";
// Month-name shape: first letter and a plausible tail, not a dictionary.
const MONTH: &str = r"[ADFJMOSN][aceopu][abceghilmnoprstuvy]{1,7}";

static DMY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\b(?:(?P<d>{DAY}) )?(?P<m>{MONTH}) (?P<y>{YEAR})\b")).unwrap()
});
static MDY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\b(?P<m>{MONTH})(?: (?P<d>{DAY}))?, (?P<y>{YEAR})\b")).unwrap()
});
static YMD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\b(?P<y>{YEAR}) (?P<m>{MONTH}) (?P<d>{DAY})\b")).unwrap()
});
static ISO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\b(?P<y>{YEAR})-(?P<m>0?[1-9]|1[0-2])-(?P<d>0?[1-9]|[12]\d|3[01])\b"
    ))
    .unwrap()
});

// Full names before their abbreviations so "January" never resolves as
// "Jan" + leftover "uary".
const MONTH_TABLE: &[(&str, &str)] = &[
    ("January", "01"),
    ("Jan", "01"),
    ("February", "02"),
    ("Feb", "02"),
    ("March", "03"),
    ("Mar", "03"),
    ("April", "04"),
    ("Apr", "04"),
    ("May", "05"),
    ("June", "06"),
    ("Jun", "06"),
    ("July", "07"),
    ("Jul", "07"),
    ("August", "08"),
    ("Aug", "08"),
    ("September", "09"),
    ("Sep", "09"),
    ("October", "10"),
    ("Oct", "10"),
    ("November", "11"),
    ("Nov", "11"),
    ("December", "12"),
    ("Dec", "12"),
];

struct RawMatch {
    year: String,
    month: String,
    day: Option<String>,
}

/// Every date-like substring in `text`, normalized to `YYYY/MM[/DD]`.
///
/// Results are grouped by grammar (DMY, MDY, YMD, ISO), each group in scan
/// order. Candidates whose month token can't be resolved are dropped.
pub fn find_dates(text: &str) -> Vec<String> {
    let mut matches = Vec::new();
    for re in [&*DMY_RE, &*MDY_RE, &*YMD_RE, &*ISO_RE] {
        for caps in re.captures_iter(text) {
            matches.push(RawMatch {
                year: caps["y"].to_string(),
                month: caps["m"].to_string(),
                day: caps.name("d").map(|d| d.as_str().to_string()),
            });
        }
    }

    let mut dates = Vec::new();
    for m in matches {
        let Some(month) = normalize_month(&m.month) else {
            continue;
        };
        match m.day {
            None => dates.push(format!("{}/{}", m.year, month)),
            Some(day) => dates.push(format!("{}/{}/{}", m.year, month, normalize_day(&day))),
        }
    }
    dates
}

/// Resolve a month token to its two-digit form, or None for a false
/// positive. A lone digit is an already-numeric month needing padding;
/// otherwise the embedded month name is substituted and any alphabetic
/// residue disqualifies the token.
fn normalize_month(token: &str) -> Option<String> {
    if token.len() == 1 && token.as_bytes()[0].is_ascii_digit() {
        return Some(format!("0{token}"));
    }

    let mut resolved = token.to_string();
    for (name, number) in MONTH_TABLE {
        if let Some(pos) = resolved.find(name) {
            resolved.replace_range(pos..pos + name.len(), number);
            break;
        }
    }

    if resolved.chars().any(|c| c.is_alphabetic()) {
        return None;
    }
    Some(resolved)
}

fn normalize_day(token: &str) -> String {
    if token.len() == 1 {
        format!("0{token}")
    } else {
        token.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dmy_and_iso() {
        let dates = find_dates("The event occurred on 5 March 1990 and again on 1990-03-07.");
        assert!(dates.contains(&"1990/03/05".to_string()));
        assert!(dates.contains(&"1990/03/07".to_string()));
        assert_eq!(dates.len(), 2);
    }

    #[test]
    fn grammar_order_beats_text_order() {
        // ISO appears first in the text but DMY is scanned first
        let dates = find_dates("On 1990-03-07, then on 5 March 1990.");
        assert_eq!(dates, vec!["1990/03/05", "1990/03/07"]);
    }

    #[test]
    fn two_digit_year_is_literal() {
        // no century inference: the captured digits go straight through
        assert_eq!(find_dates("March 5, 90"), vec!["90/03/05"]);
    }

    #[test]
    fn month_without_day() {
        assert_eq!(find_dates("In September 2001 things changed."), vec!["2001/09"]);
    }

    #[test]
    fn mdy_variants() {
        assert_eq!(find_dates("Born May 28, 1968 in Oslo."), vec!["1968/05/28"]);
        assert_eq!(find_dates("Dated March, 1990."), vec!["1990/03"]);
    }

    #[test]
    fn ymd_textual() {
        assert_eq!(find_dates("registered 1990 March 5 exactly"), vec!["1990/03/05"]);
    }

    #[test]
    fn iso_single_digit_parts_are_padded() {
        assert_eq!(find_dates("log 2001-3-7 end"), vec!["2001/03/07"]);
        assert_eq!(find_dates("log 2001-10-07 end"), vec!["2001/10/07"]);
    }

    #[test]
    fn month_shaped_word_without_table_hit_is_dropped() {
        // "Monsoon" fits the letter-shape class but is no month
        assert!(find_dates("Monsoon 77 ruined it").is_empty());
    }

    #[test]
    fn leftover_letters_after_substitution_are_dropped() {
        // "Mayhem" contains "May" but the residue disqualifies it
        assert!(find_dates("Mayhem 45 broke out").is_empty());
    }

    #[test]
    fn small_numbers_are_not_years() {
        assert!(find_dates("Chapter 7 May 12 update").is_empty());
        assert!(find_dates("May 31").is_empty());
    }

    #[test]
    fn empty_and_garbage_input() {
        assert!(find_dates("").is_empty());
        assert!(find_dates("no dates here at all").is_empty());
    }

    #[test]
    fn output_shape_and_idempotence() {
        let shape = Regex::new(r"^\d{2,4}/\d{2}(/\d{2})?$").unwrap();
        let text = "5 March 1990, March 5, 90, 1990 March 5, 1990-03-07, \
                    September 2001, Monsoon 77, 3 Dec 41";
        let first = find_dates(text);
        assert!(!first.is_empty());
        for d in &first {
            assert!(shape.is_match(d), "malformed output: {d}");
        }
        assert_eq!(first, find_dates(text));
    }
}
