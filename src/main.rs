use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use leakscan::analyzer;
use leakscan::frequency::RangeCache;

#[derive(Debug, Parser)]
#[command(
    name = "leakscan",
    version,
    about = "Preflop leak scanner for poker hand histories",
    author
)]
struct Cli {
    /// Hand-history transcript file
    history: PathBuf,

    /// Directory of <scenario_key>.json frequency-table files
    #[arg(long)]
    ranges: PathBuf,

    /// Emit the report as JSON instead of text
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Disable ANSI colors in text output
    #[arg(long = "no-color", default_value_t = false)]
    no_color: bool,
}

fn main() -> Result<()> {
    let _ = color_eyre::install();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let text = fs::read_to_string(&cli.history)
        .with_context(|| format!("reading history file {}", cli.history.display()))?;
    let mut tables = RangeCache::new(&cli.ranges);

    let analysis = analyzer::analyze(&text, &mut tables);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&analysis.report)?);
    } else {
        print!("{}", analysis.report.render_text(!cli.no_color));
        if analysis.ignored_action_lines > 0 {
            eprintln!(
                "note: {} action lines had unrecognized phrasing and were ignored",
                analysis.ignored_action_lines
            );
        }
    }

    Ok(())
}
