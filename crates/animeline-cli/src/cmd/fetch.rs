//! `animeline fetch` - preview one ranking category without loading

use anyhow::{Context, Result};
use clap::Args;
use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};

use animeline_mal::{MalRankingApi, MalTokenEndpoint, RankingCategory, TokenManager, transform};

use crate::config::{Config, Credentials};

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Ranking category to fetch (all, airing, upcoming)
    #[arg(short = 'r', long, default_value = "all")]
    pub category: String,

    /// Rows to display
    #[arg(short, long, default_value_t = 10)]
    pub top: usize,
}

pub fn run(args: FetchArgs, config: &Config) -> Result<()> {
    let category = RankingCategory::from_name(&args.category)
        .with_context(|| format!("unknown ranking category: {}", args.category))?;

    let creds = Credentials::from_env();
    let mut tokens = TokenManager::new(
        creds.mal_credential(),
        Box::new(MalTokenEndpoint::new(&config.mal.token_url)),
    );
    let api = MalRankingApi::new(&config.mal.ranking_url);

    let extraction = animeline_mal::extract(&api, &mut tokens, &[category])?;
    let ranking_date = chrono::Local::now().date_naive();
    let rows: Vec<_> = extraction
        .pages
        .iter()
        .flat_map(|page| transform(&page.records, page.category, ranking_date))
        .collect();

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Rank").fg(Color::Cyan),
            Cell::new("Title").fg(Color::Cyan),
            Cell::new("Mean").fg(Color::Cyan),
            Cell::new("Bucket").fg(Color::Cyan),
            Cell::new("Genre").fg(Color::Cyan),
        ]);

    for row in rows.iter().take(args.top) {
        table.add_row(vec![
            row.rank.map_or(String::new(), |r| r.to_string()),
            row.title.clone().unwrap_or_default(),
            row.mean.map_or(String::new(), |m| format!("{m:.2}")),
            row.score_bucket
                .map_or(String::new(), |b| b.to_string()),
            row.genre.clone().unwrap_or_default(),
        ]);
    }

    eprintln!("\n{table}");
    log::info!(
        "{category}: {} records, {} rows",
        extraction.total_records(),
        rows.len()
    );
    Ok(())
}
