//! `animeline run` - full extract-transform-load pipeline

use anyhow::{Context, Result};
use clap::Args;

use animeline_bigquery::{BigQueryLoader, TableRef, WriteMode, WriteToken};
use animeline_mal::{MalRankingApi, MalTokenEndpoint, RankingCategory, TokenManager, transform};

use crate::config::{Config, Credentials};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Extract and transform but skip the load
    #[arg(long)]
    pub dry_run: bool,

    /// Truncate the destination before writing (scheduled runs append)
    #[arg(long)]
    pub replace: bool,
}

pub fn run(args: RunArgs, config: &Config) -> Result<()> {
    let creds = Credentials::from_env();

    let mut tokens = TokenManager::new(
        creds.mal_credential(),
        Box::new(MalTokenEndpoint::new(&config.mal.token_url)),
    );
    let api = MalRankingApi::new(&config.mal.ranking_url);

    // Extract. A failed token refresh is the only error that surfaces here;
    // per-category failures are already folded into the reports.
    let extraction = animeline_mal::extract(&api, &mut tokens, &RankingCategory::RUN_SET)
        .context("authentication failed")?;

    // Transform. The ranking date is fixed once so the whole batch shares it
    // no matter when each category finished fetching.
    let ranking_date = chrono::Local::now().date_naive();
    let mut rows = Vec::with_capacity(extraction.total_records());
    for page in &extraction.pages {
        rows.extend(transform(&page.records, page.category, ranking_date));
    }
    log::info!(
        "{} records across {} categories -> {} rows",
        extraction.total_records(),
        extraction.pages.len(),
        rows.len()
    );

    // Load
    let table = TableRef::new(&creds.project_id, &creds.dataset_id, &config.bigquery.table);
    let mode = if args.replace {
        WriteMode::Replace
    } else {
        WriteMode::Append
    };

    let loaded = if args.dry_run {
        log::info!("dry-run: skipping load into {table}");
        0
    } else {
        let loader = BigQueryLoader::with_base_url(
            WriteToken::new(&creds.warehouse_token),
            &config.bigquery.base_url,
        );
        loader
            .load(&rows, &table, mode)
            .with_context(|| format!("load into {table} failed"))?
            .rows_loaded
    };

    // Summary
    println!();
    println!("=== Run Complete ===");
    println!("{:<10} {:<10} {:>8}", "Category", "Status", "Records");
    println!("{}", "-".repeat(30));
    for report in &extraction.reports {
        println!(
            "{:<10} {:<10} {:>8}",
            report.category, report.outcome, report.records
        );
    }
    println!();
    println!(
        "Date: {ranking_date}  Rows: {}  Loaded: {loaded}",
        rows.len()
    );

    Ok(())
}
