mod extract;
mod fetch;
mod html;
mod report;

use std::path::Path;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use extract::stats::PlayerStats;

#[derive(Parser)]
#[command(name = "wiki_scraper", about = "Wikipedia page fetcher and structured-data extractor")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a page and report on the response
    Fetch {
        url: String,
        /// Query parameter as key=value (repeatable)
        #[arg(short, long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,
        /// Dump the raw response to a file
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Extract normalized dates from one or more pages
    Dates {
        #[arg(required = true)]
        urls: Vec<String>,
        /// Write a <slug>_output.txt report per page into this directory
        #[arg(short, long, value_name = "DIR")]
        out_dir: Option<PathBuf>,
    },
    /// List Wikipedia article links found on a page
    Articles {
        url: String,
        /// Save the full URL inventory to a file
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Extract the event schedule from a season calendar page
    Events {
        url: String,
        /// Write an empty betting slip (markdown) to this file
        #[arg(long, value_name = "FILE")]
        slip: Option<PathBuf>,
    },
    /// Top scorers per conference-semifinal team for a playoff season
    Stats {
        url: String,
        /// Season label to read averages from
        #[arg(short, long, default_value = "2019-20")]
        season: String,
        /// Players ranked per team
        #[arg(short = 'n', long, default_value = "3")]
        top: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Fetch { url, params, out } => run_fetch(&url, &params, out.as_deref()).await,
        Commands::Dates { urls, out_dir } => run_dates(urls, out_dir.as_deref()).await,
        Commands::Articles { url, out } => run_articles(&url, out.as_deref()).await,
        Commands::Events { url, slip } => run_events(&url, slip.as_deref()).await,
        Commands::Stats { url, season, top } => run_stats(&url, &season, top).await,
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

async fn run_fetch(url: &str, raw_params: &[String], out: Option<&Path>) -> Result<()> {
    let params = parse_params(raw_params)?;
    let client = fetch::client()?;
    let page = fetch::get_page(&client, url, &params).await?;
    println!(
        "{} -> {} ({} bytes in {} ms)",
        page.url,
        page.status,
        page.body.len(),
        page.latency_ms
    );
    if let Some(path) = out {
        report::write_page_dump(path, &page.url, &page.body)?;
        println!("Saved response to {}", path.display());
    }
    Ok(())
}

async fn run_dates(urls: Vec<String>, out_dir: Option<&Path>) -> Result<()> {
    let client = fetch::client()?;
    let targets: Vec<(String, String)> = urls
        .iter()
        .map(|u| (fetch::page_slug(u), u.clone()))
        .collect();
    println!("Fetching {} pages...", targets.len());
    let pages = fetch::fetch_many(&client, targets).await?;

    use rayon::prelude::*;
    let extracted: Vec<(String, Vec<String>)> = pages
        .par_iter()
        .filter_map(|p| {
            p.html
                .as_deref()
                .map(|body| (p.slug.clone(), extract::dates::find_dates(body)))
        })
        .collect();

    if let Some(dir) = out_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating output directory {}", dir.display()))?;
    }
    for (slug, dates) in &extracted {
        println!("{}: {} dates", slug, dates.len());
        if let Some(dir) = out_dir {
            report::write_dates(&dir.join(format!("{slug}_output.txt")), dates)?;
        }
    }

    let failed = pages.iter().filter(|p| p.error.is_some()).count();
    if failed > 0 {
        warn!("{} of {} pages failed to fetch", failed, pages.len());
    }
    Ok(())
}

async fn run_articles(url: &str, out: Option<&Path>) -> Result<()> {
    let client = fetch::client()?;
    let body = fetch::get_html(&client, url).await?;
    let all = extract::articles::find_urls(url, &body);
    let wiki = extract::articles::wikipedia_articles(&all);

    for article in &wiki {
        println!("{article}");
    }
    println!("\n{} urls on page, {} wikipedia articles", all.len(), wiki.len());

    if let Some(path) = out {
        report::write_urls(path, &all, &wiki)?;
        println!("Saved url report to {}", path.display());
    }
    Ok(())
}

async fn run_events(url: &str, slip: Option<&Path>) -> Result<()> {
    let client = fetch::client()?;
    let body = fetch::get_html(&client, url).await?;
    let events = extract::events::extract_schedule(&body)?;

    println!("{:<18} | {:<28} | {}", "Date", "Venue", "Discipline");
    println!("{}", "-".repeat(62));
    for event in &events {
        println!(
            "{:<18} | {:<28} | {}",
            event.date,
            truncate(&event.venue, 28),
            event.discipline
        );
    }
    println!("\n{} events", events.len());

    if let Some(path) = slip {
        report::write_betting_slip(path, &events)?;
        println!("Saved betting slip to {}", path.display());
    }
    Ok(())
}

async fn run_stats(url: &str, season: &str, top: usize) -> Result<()> {
    let client = fetch::client()?;
    let bracket = fetch::get_html(&client, url).await?;
    let teams = extract::stats::semifinal_teams(url, &bracket)?;
    info!("Found {} semifinal teams", teams.len());

    let mut comparison: Vec<(String, Vec<PlayerStats>)> = Vec::new();
    for team in teams {
        let team_page = match fetch::get_html(&client, &team.url).await {
            Ok(body) => body,
            Err(e) => {
                warn!("skipping {}: {:#}", team.name, e);
                continue;
            }
        };
        let players = match extract::stats::roster_players(&team.url, &team_page) {
            Ok(players) => players,
            Err(e) => {
                warn!("skipping {}: {:#}", team.name, e);
                continue;
            }
        };

        let targets: Vec<(String, String)> = players
            .into_iter()
            .map(|p| (p.name, p.url))
            .collect();
        println!("Fetching {} player pages for {}...", targets.len(), team.name);
        let pages = fetch::fetch_many(&client, targets).await?;

        let mut roster_stats = Vec::new();
        for page in pages {
            let Some(body) = page.html else { continue };
            roster_stats.push(PlayerStats {
                team: team.name.clone(),
                name: page.slug,
                stats: extract::stats::season_averages(&body, season),
            });
        }
        comparison.push((team.name, extract::stats::top_by_ppg(roster_stats, top)));
    }

    println!(
        "{:>3} | {:<22} | {:<22} | {:>5} | {:>5} | {:>5}",
        "#", "Team", "Player", "PPG", "BPG", "RPG"
    );
    println!("{}", "-".repeat(72));
    let mut n = 0;
    for (team, players) in &comparison {
        for player in players {
            n += 1;
            println!(
                "{:>3} | {:<22} | {:<22} | {:>5} | {:>5} | {:>5}",
                n,
                truncate(team, 22),
                truncate(&player.name, 22),
                fmt_stat(player.stats.ppg),
                fmt_stat(player.stats.bpg),
                fmt_stat(player.stats.rpg)
            );
        }
    }
    println!("\n{} teams | season {}", comparison.len(), season);
    Ok(())
}

fn parse_params(raw: &[String]) -> Result<Vec<(String, String)>> {
    raw.iter()
        .map(|p| {
            p.split_once('=')
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .with_context(|| format!("parameter '{p}' is not key=value"))
        })
        .collect()
}

fn fmt_stat(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.1}")).unwrap_or_else(|| "-".into())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
