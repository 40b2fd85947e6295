//! Just enough HTML navigation for Wikipedia pages: tag stripping, entity
//! decoding, and table/row/cell slicing. Not a general-purpose parser.

use std::sync::LazyLock;

use regex::Regex;

static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)<a\s[^>]*href="([^"]*)"[^>]*>(.*?)</a>"#).unwrap());
static NUMERIC_ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"&#(\d+);").unwrap());

const NAMED_ENTITIES: &[(&str, &str)] = &[
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&apos;", "'"),
    ("&nbsp;", " "),
    ("&ndash;", "\u{2013}"),
    ("&mdash;", "\u{2014}"),
    ("&minus;", "\u{2212}"),
    ("&amp;", "&"), // last so it can't create new entities
];

/// Drop all tags from a fragment and return its visible text,
/// entity-decoded, with whitespace collapsed to single spaces.
pub fn strip_tags(fragment: &str) -> String {
    let mut text = String::with_capacity(fragment.len());
    let mut in_tag = false;
    for ch in fragment.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => text.push(ch),
            _ => {}
        }
    }
    normalize_ws(&decode_entities(&text))
}

pub fn decode_entities(s: &str) -> String {
    let mut out = s.to_string();
    for (entity, replacement) in NAMED_ENTITIES {
        if out.contains(entity) {
            out = out.replace(entity, replacement);
        }
    }
    NUMERIC_ENTITY_RE
        .replace_all(&out, |caps: &regex::Captures| {
            caps[1]
                .parse::<u32>()
                .ok()
                .and_then(char::from_u32)
                .map(String::from)
                .unwrap_or_default()
        })
        .into_owned()
}

fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First `<table>` block whose opening tag contains every marker.
/// The returned slice spans nested tables (depth-aware close matching).
pub fn table_block<'a>(html: &'a str, markers: &[&str]) -> Option<&'a str> {
    table_block_from(html, 0, markers)
}

/// Like [`table_block`], but searching from a byte offset. Used to pick up
/// a table that follows a known landmark (e.g. a caption).
pub fn table_block_from<'a>(html: &'a str, from: usize, markers: &[&str]) -> Option<&'a str> {
    let mut search = from;
    loop {
        let start = html[search..].find("<table")? + search;
        let open_end = html[start..].find('>')? + start + 1;
        let open_tag = &html[start..open_end];
        if markers.iter().all(|m| open_tag.contains(m)) {
            return close_table(html, start, open_end);
        }
        search = open_end;
    }
}

fn close_table(html: &str, start: usize, open_end: usize) -> Option<&str> {
    let mut depth = 1usize;
    let mut pos = open_end;
    while depth > 0 {
        let next_open = html[pos..].find("<table");
        let next_close = html[pos..].find("</table");
        match (next_open, next_close) {
            (Some(o), Some(c)) if o < c => {
                depth += 1;
                pos += o + "<table".len();
            }
            (_, Some(c)) => {
                depth -= 1;
                pos += c + "</table".len();
            }
            _ => return None,
        }
    }
    let end = html[pos..].find('>').map(|e| pos + e + 1).unwrap_or(pos);
    Some(&html[start..end])
}

/// All `<tr>` fragments in a table block, nested rows included (matching
/// what a full tree walk would yield for the bracket-table row offsets).
pub fn rows(table: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut pos = 0;
    while let Some(r) = find_tag(table, pos, "tr") {
        let end = table[r..]
            .find("</tr>")
            .map(|e| r + e)
            .unwrap_or(table.len());
        out.push(&table[r..end]);
        pos = r + "<tr".len();
    }
    out
}

/// Raw inner markup of each `<td>` cell in a row fragment.
pub fn cell_blocks(row: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut pos = 0;
    while let Some(c) = find_tag(row, pos, "td") {
        let open_end = match row[c..].find('>') {
            Some(e) => c + e + 1,
            None => break,
        };
        let end = row[open_end..]
            .find("</td>")
            .map(|e| open_end + e)
            .unwrap_or(row.len());
        out.push(&row[open_end..end]);
        pos = end;
    }
    out
}

/// Visible text of each `<td>` cell in a row fragment.
pub fn data_cells(row: &str) -> Vec<String> {
    cell_blocks(row).into_iter().map(strip_tags).collect()
}

/// First anchor in a fragment as (href, visible text). Anchors without an
/// href attribute don't count.
pub fn first_link(fragment: &str) -> Option<(String, String)> {
    LINK_RE
        .captures(fragment)
        .map(|caps| (decode_entities(&caps[1]), strip_tags(&caps[2])))
}

// Next occurrence of `<name` that is an actual tag start, i.e. followed by
// '>' or whitespace ("<tr" must not hit "<track").
fn find_tag(haystack: &str, from: usize, name: &str) -> Option<usize> {
    let opener = format!("<{}", name);
    let mut pos = from;
    while let Some(i) = haystack[pos..].find(&opener) {
        let start = pos + i;
        let rest = &haystack[start + opener.len()..];
        match rest.chars().next() {
            Some('>') | Some(' ') | Some('\t') | Some('\n') | Some('\r') => return Some(start),
            _ => pos = start + opener.len(),
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tags_and_entities() {
        let s = strip_tags("<td><a href=\"/x\">S&ouml;lden</a>,&#160;Austria&nbsp;<sup>[1]</sup></td>");
        // unknown named entities stay as-is, numeric ones decode
        assert_eq!(s, "S&ouml;lden, Austria [1]");
        assert_eq!(strip_tags("<b>26   October\n2019</b>"), "26 October 2019");
        assert_eq!(strip_tags("A &amp;amp; B"), "A &amp; B");
    }

    #[test]
    fn finds_table_by_markers() {
        let html = r#"<p>x</p><table class="infobox"><tr><td>a</td></tr></table>
            <table class="wikitable plainrowheaders"><tr><td>b</td></tr></table>"#;
        let t = table_block(html, &["wikitable plainrowheaders"]).unwrap();
        assert!(t.contains(">b<"));
        assert!(!t.contains("infobox"));
        assert!(table_block(html, &["sortable"]).is_none());
    }

    #[test]
    fn table_block_spans_nested_tables() {
        let html = r#"<table class="outer"><tr><td>
            <table class="inner"><tr><td>deep</td></tr></table>
            </td></tr><tr><td>tail</td></tr></table>"#;
        let t = table_block(html, &["outer"]).unwrap();
        assert!(t.contains("tail"));
        assert!(t.ends_with("</table>"));
    }

    #[test]
    fn rows_and_cells() {
        let table = "<table><tr><th>h</th><td>1</td><td>two</td></tr><tr><td>3</td></tr></table>";
        let rs = rows(table);
        assert_eq!(rs.len(), 2);
        assert_eq!(data_cells(rs[0]), vec!["1", "two"]);
        assert_eq!(data_cells(rs[1]), vec!["3"]);
    }

    #[test]
    fn tr_prefix_tags_are_not_rows() {
        let table = "<table><track src=\"x\"><tr><td>1</td></tr></table>";
        assert_eq!(rows(table).len(), 1);
    }

    #[test]
    fn first_link_href_and_text() {
        let row = r#"<td><a href="/wiki/Utah_Jazz" title="Utah Jazz"><b>Utah</b> Jazz</a></td>"#;
        let (href, text) = first_link(row).unwrap();
        assert_eq!(href, "/wiki/Utah_Jazz");
        assert_eq!(text, "Utah Jazz");
    }
}
