//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `photo_places` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::process;

use photo_places::initialization::init_logger_with;
use photo_places::{run_batch, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file (if it exists). This allows
    // setting GEOCODE_API_KEY in .env without exporting it manually.
    let _ = dotenvy::dotenv();

    // Parse command-line arguments into Config
    let config = Config::parse();

    // Initialize logger based on config
    let log_level = config.log_level.clone();
    let log_format = config.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    match run_batch(config).await {
        Ok(report) => {
            println!(
                "{} {} record{} in {:.1}s: {} by GPS, {} inferred from {} span{}, {} unresolved ({} remote fetch{})",
                "done".green().bold(),
                report.total_records,
                if report.total_records == 1 { "" } else { "s" },
                report.elapsed_seconds,
                report.resolved_by_gps,
                report.inferred_by_time,
                report.span_count,
                if report.span_count == 1 { "" } else { "s" },
                report.unresolved,
                report.remote_fetches,
                if report.remote_fetches == 1 { "" } else { "es" },
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("{} {:#}", "photo_places error:".red().bold(), e);
            process::exit(1);
        }
    }
}
