//! sp-walker CLI
//!
//! Finds the first file key visible in an S3 bucket.

use clap::Parser;
use sp_cli_common::{format_duration, format_number, init_logging};

mod args;
mod run;

use args::Cli;

/// Exit code when the walk finished without finding a file.
const EXIT_NO_MATCH: i32 = 3;

/// Exit code when nothing was found and some prefixes were denied.
const EXIT_NO_MATCH_DENIED: i32 = 4;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    // Initialize logging (to stderr, so stdout is clean for the report)
    init_logging(args.log_level)?;

    let report = run::execute(args).await?;
    let stats = &report.stats;

    // Report results to stderr
    eprintln!();
    eprintln!("Walk completed:");
    match report.uri() {
        Some(uri) => eprintln!("  First file:       {}", uri),
        None => eprintln!("  First file:       (none)"),
    }
    eprintln!(
        "  Prefixes visited: {}",
        format_number(stats.prefixes_visited as u64)
    );
    eprintln!(
        "  Pages fetched:    {}",
        format_number(stats.pages_fetched as u64)
    );
    eprintln!(
        "  Objects scanned:  {}",
        format_number(stats.objects_scanned as u64)
    );
    eprintln!("  Denied prefixes:  {}", stats.denied_prefixes.len());

    if let Some(duration) = stats.duration().and_then(|d| d.to_std().ok()) {
        eprintln!("  Duration:         {}", format_duration(duration));
    }

    for prefix in &stats.denied_prefixes {
        eprintln!("  Denied: {}", prefix);
    }

    if report.key.is_none() {
        std::process::exit(if stats.has_denials() {
            EXIT_NO_MATCH_DENIED
        } else {
            EXIT_NO_MATCH
        });
    }

    Ok(())
}
