//! animeline - MyAnimeList ranking ETL
//!
//! Pulls the MAL ranking views, flattens them into one row per
//! (anime, category, genre), and appends the batch to a BigQuery table
//! for historical trend analysis.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "animeline")]
#[command(about = "MyAnimeList ranking ETL")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Only log warnings and errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Config file path (default: ./animeline.toml or ~/.config/animeline/config.toml)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full extract-transform-load pipeline
    Run(cmd::run::RunArgs),
    /// Fetch one ranking category and preview the rows (no load)
    Fetch(cmd::fetch::FetchArgs),
    /// Show current configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    animeline_core::init_logging(cli.quiet, cli.debug);

    // Load configuration
    let config = if let Some(path) = cli.config {
        Config::from_file(&path)?
    } else {
        Config::load()?
    };

    match cli.command {
        Command::Run(args) => cmd::run::run(args, &config),
        Command::Fetch(args) => cmd::fetch::run(args, &config),
        Command::Config => {
            use comfy_table::{
                Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL,
            };

            let configured = |key: &str| {
                if std::env::var(key).is_ok_and(|v| !v.is_empty()) {
                    "configured"
                } else {
                    "not set"
                }
            };

            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .apply_modifier(UTF8_ROUND_CORNERS)
                .set_header(vec![
                    Cell::new("Setting").fg(Color::Cyan),
                    Cell::new("Value").fg(Color::Cyan),
                ]);

            table.add_row(vec!["Ranking URL", &config.mal.ranking_url]);
            table.add_row(vec!["Token URL", &config.mal.token_url]);
            table.add_row(vec!["BigQuery URL", &config.bigquery.base_url]);
            table.add_row(vec!["Destination table", &config.bigquery.table]);
            table.add_row(vec!["ACCESS_TOKEN", configured("ACCESS_TOKEN")]);
            table.add_row(vec!["REFRESH_TOKEN", configured("REFRESH_TOKEN")]);
            table.add_row(vec!["CLIENT_ID", configured("CLIENT_ID")]);
            table.add_row(vec!["PROJECT_ID", configured("PROJECT_ID")]);
            table.add_row(vec!["DATASET_ID", configured("DATASET_ID")]);
            table.add_row(vec!["GOOGLE_ACCESS_TOKEN", configured("GOOGLE_ACCESS_TOKEN")]);

            eprintln!("\n{table}");
            Ok(())
        }
    }
}
