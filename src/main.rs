mod data_loader;
mod error;
mod match_index;
mod optimizer;
mod ranking;
mod rating_context;
mod rating_series;
mod report;
mod solver;
mod util;
mod window;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use data_loader::*;
use ranking::*;
use rating_context::*;
use report::*;

/*
    Reads the handicap table written by the regression step and writes one rating per team per match day.
    Pass a JSON file as the first argument to override paths or optimizer settings in RatingContext.
*/

fn main() -> Result<()> {
    init_logging();

    let ranking_context = match std::env::args().nth(1) {
        Some(path) => RatingContext::from_json_file(&path)
            .with_context(|| format!("failed to read config {path}"))?,
        None => RatingContext::default(),
    };

    let matches = load_matches(&ranking_context.data_path)
        .with_context(|| format!("failed to load matches from {}", ranking_context.data_path))?;
    info!(matches = matches.len(), path = %ranking_context.data_path, "loaded handicap table");

    let league = League::new(matches).context("cannot rate an empty season")?;
    let series = league.run(&ranking_context);

    series
        .write_csv(&ranking_context.output_path)
        .with_context(|| format!("failed to write {}", ranking_context.output_path))?;
    info!(rows = series.len(), "Rolling team ratings saved to {}", ranking_context.output_path);

    output_report(&series);
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
