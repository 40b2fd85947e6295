//! NBA playoff statistics: bracket → team rosters → per-player season
//! averages, all pulled from Wikipedia table markup.

use std::sync::LazyLock;

use anyhow::{bail, Context, Result};
use regex::Regex;

use crate::extract::articles;
use crate::html;

// The playoff bracket is a bare layout table; these attributes identify it.
const BRACKET_MARKERS: &[&str] = &[r#"border="0""#, r#"cellpadding="0""#, r#"cellspacing="0""#];

// Conference-semifinal team rows sit at fixed offsets in the bracket table
// (two teams per series, four series).
const SEMIFINAL_ROWS: [usize; 8] = [4, 6, 16, 18, 28, 30, 40, 42];

// Regular-season average columns on a player's statistics table.
const RPG_CELL: usize = 8;
const BPG_CELL: usize = 11;
const PPG_CELL: usize = 12;

static PAREN_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(\w*\)").unwrap());

#[derive(Debug, Clone, PartialEq)]
pub struct TeamLink {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerLink {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatLine {
    pub ppg: Option<f64>,
    pub bpg: Option<f64>,
    pub rpg: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct PlayerStats {
    pub team: String,
    pub name: String,
    pub stats: StatLine,
}

/// The eight conference-semifinal teams from a season's playoff bracket.
pub fn semifinal_teams(base_url: &str, page: &str) -> Result<Vec<TeamLink>> {
    let table = html::table_block(page, BRACKET_MARKERS).context("no playoff bracket on page")?;
    let rows = html::rows(table);

    let mut teams = Vec::new();
    for idx in SEMIFINAL_ROWS {
        let Some(row) = rows.get(idx) else {
            bail!("bracket has {} rows, no team row at {}", rows.len(), idx);
        };
        let (href, name) = html::first_link(row)
            .with_context(|| format!("no team link in bracket row {idx}"))?;
        teams.push(TeamLink {
            name,
            url: articles::resolve_href(base_url, &href),
        });
    }
    Ok(teams)
}

/// Player links from a team page's roster listing. The name sits in the
/// third data cell; captain/two-way markers like "(C)" are dropped.
pub fn roster_players(base_url: &str, page: &str) -> Result<Vec<PlayerLink>> {
    let caption = page
        .find("Roster listing")
        .context("no roster listing on team page")?;
    let table = html::table_block_from(page, caption, &["sortable"])
        .context("no sortable roster table after the caption")?;

    let mut players = Vec::new();
    for row in html::rows(table) {
        let cells = html::cell_blocks(row);
        let Some(name_cell) = cells.get(2) else {
            continue;
        };
        let Some((href, _)) = html::first_link(name_cell) else {
            continue;
        };
        let name = PAREN_SUFFIX_RE
            .replace_all(&html::strip_tags(name_cell), "")
            .trim()
            .to_string();
        players.push(PlayerLink {
            name,
            url: articles::resolve_href(base_url, &href),
        });
    }
    Ok(players)
}

/// Per-game averages for the requested season from a player page. Players
/// without a row for that season get an empty line (they still rank, as
/// zeros).
pub fn season_averages(page: &str, season: &str) -> StatLine {
    let Some(table) = html::table_block(page, &["wikitable sortable"]) else {
        return StatLine::default();
    };
    let season_re = season_regex(season);
    let Some(row) = html::rows(table)
        .into_iter()
        .find(|r| season_re.is_match(&html::strip_tags(r)))
    else {
        return StatLine::default();
    };

    let cells = html::data_cells(row);
    StatLine {
        ppg: cells.get(PPG_CELL).and_then(|c| stat_cell(c)),
        bpg: cells.get(BPG_CELL).and_then(|c| stat_cell(c)),
        rpg: cells.get(RPG_CELL).and_then(|c| stat_cell(c)),
    }
}

/// Descending by PPG; a missing PPG ranks as 0.
pub fn top_by_ppg(mut players: Vec<PlayerStats>, n: usize) -> Vec<PlayerStats> {
    players.sort_by(|a, b| {
        let (x, y) = (a.stats.ppg.unwrap_or(0.0), b.stats.ppg.unwrap_or(0.0));
        y.partial_cmp(&x).unwrap_or(std::cmp::Ordering::Equal)
    });
    players.truncate(n);
    players
}

// "2019-20", "2019–20" and friends all match the season label as printed
// on the page, whatever dash Wikipedia used.
fn season_regex(season: &str) -> Regex {
    let parts: Vec<String> = season
        .split(|c: char| !c.is_ascii_digit())
        .filter(|p| !p.is_empty())
        .map(regex::escape)
        .collect();
    let pattern = if parts.is_empty() {
        regex::escape(season)
    } else {
        parts.join(".*")
    };
    Regex::new(&pattern).unwrap()
}

// League-leader markers and placeholders ("25.9*", "–") are decoration.
fn stat_cell(text: &str) -> Option<f64> {
    let cleaned: String = text.chars().filter(|c| !matches!(c, '*' | '-')).collect();
    cleaned.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "https://en.wikipedia.org/wiki/2020_NBA_playoffs";

    // A bracket-shaped layout table: mostly spacer rows, with team anchors
    // at the semifinal offsets.
    fn bracket_html() -> String {
        let mut rows = String::new();
        for i in 0..44 {
            if SEMIFINAL_ROWS.contains(&i) {
                rows.push_str(&format!(
                    "<tr><td></td><td><a href=\"/wiki/Team_{i}\">Team {i}</a></td><td>4</td></tr>"
                ));
            } else {
                rows.push_str("<tr><td>&nbsp;</td></tr>");
            }
        }
        format!(
            "<table border=\"0\" cellpadding=\"0\" cellspacing=\"0\">{rows}</table>"
        )
    }

    #[test]
    fn bracket_rows_give_eight_teams() {
        let html = bracket_html();
        let teams = semifinal_teams(PAGE, &html).unwrap();
        assert_eq!(teams.len(), 8);
        assert_eq!(teams[0].name, "Team 4");
        assert_eq!(teams[0].url, "https://en.wikipedia.org/wiki/Team_4");
        assert_eq!(teams[7].name, "Team 42");
    }

    #[test]
    fn truncated_bracket_is_an_error() {
        let html = "<table border=\"0\" cellpadding=\"0\" cellspacing=\"0\">\
                    <tr><td>a</td></tr></table>";
        assert!(semifinal_teams(PAGE, html).is_err());
    }

    #[test]
    fn roster_names_and_links() {
        let page = std::fs::read_to_string("tests/fixtures/team_roster.html").unwrap();
        let players = roster_players(PAGE, &page).unwrap();
        let names: Vec<&str> = players.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Rudy Gobert", "Donovan Mitchell", "Joe Ingles"]);
        // "(C)" captain marker is stripped from the name but not the URL
        assert_eq!(players[0].url, "https://en.wikipedia.org/wiki/Rudy_Gobert");
    }

    #[test]
    fn season_row_supplies_the_average_columns() {
        let page = std::fs::read_to_string("tests/fixtures/player_stats.html").unwrap();
        let line = season_averages(&page, "2019-20");
        assert_eq!(line.ppg, Some(24.0));
        assert_eq!(line.bpg, Some(0.2));
        assert_eq!(line.rpg, Some(4.4));
    }

    #[test]
    fn missing_season_gives_empty_line() {
        let page = std::fs::read_to_string("tests/fixtures/player_stats.html").unwrap();
        assert_eq!(season_averages(&page, "1997-98"), StatLine::default());
        assert_eq!(season_averages("<p>no tables</p>", "2019-20"), StatLine::default());
    }

    #[test]
    fn ranking_treats_missing_ppg_as_zero() {
        let player = |name: &str, ppg: Option<f64>| PlayerStats {
            team: "T".into(),
            name: name.into(),
            stats: StatLine { ppg, bpg: None, rpg: None },
        };
        let top = top_by_ppg(
            vec![
                player("benchwarmer", None),
                player("star", Some(27.5)),
                player("role", Some(11.2)),
                player("rookie", Some(3.0)),
            ],
            3,
        );
        let names: Vec<&str> = top.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["star", "role", "rookie"]);
    }

    #[test]
    fn decorations_are_stripped_from_stat_cells() {
        assert_eq!(stat_cell("25.9*"), Some(25.9));
        assert_eq!(stat_cell("15.1-"), Some(15.1));
        assert_eq!(stat_cell("–"), None);
        assert_eq!(stat_cell(""), None);
    }
}
