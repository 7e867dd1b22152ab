//! bucketprobe CLI
//!
//! Enumerates S3 buckets from wordlists and domain mutations.

use bp_cli_common::{format_duration, format_number, format_rate, init_logging};
use clap::Parser;
use console::style;

mod args;
mod progress;
mod run;

use args::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    // Logs go to stderr, stdout carries found buckets only
    init_logging(args.log_level)?;

    let report = run::execute(args).await?;
    let stats = &report.stats;
    let elapsed = stats
        .duration()
        .and_then(|d| d.to_std().ok())
        .unwrap_or_default();

    eprintln!();
    eprintln!(
        "Completed {} requests in {}",
        format_number(stats.probed),
        format_duration(elapsed)
    );
    eprintln!("  Found:        {}", style(format_number(stats.found)).green());
    eprintln!("  Not found:    {}", format_number(stats.not_found));
    eprintln!("  Rate limited: {}", format_number(stats.rate_limited));
    eprintln!("  Unresolved:   {}", format_number(stats.unresolved));
    eprintln!("  Errors:       {}", format_number(stats.errors));
    eprintln!("  Throughput:   {}", format_rate(stats.probed, elapsed));

    if report.cancelled {
        eprintln!(
            "  {} {} candidates were not probed",
            style("Interrupted:").yellow().bold(),
            format_number(stats.candidates.saturating_sub(stats.probed))
        );
    }

    Ok(())
}
