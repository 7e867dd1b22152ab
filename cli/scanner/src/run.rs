//! Main execution logic for the bucketprobe CLI.

use anyhow::{Context, Result};
use bp_scanner::sink::{ConsoleSink, CsvSink, FanoutSink};
use bp_scanner::{
    RetryConfig, S3Config, S3StorageClient, ScanConfig, ScanReport, Scanner, SourceConfig,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::args::Cli;
use crate::progress::ProgressReporter;

/// Candidate sources described by the arguments.
pub fn source_config(args: &Cli) -> SourceConfig {
    let mut sources = SourceConfig::new().with_keywords(args.keyword_list());

    if let Some(path) = &args.wordlist {
        sources = sources.with_wordlist(path);
    }
    if let Some(domain) = &args.domain {
        sources = sources.with_domain(domain);
    }
    if let Some(path) = &args.mutations {
        sources = sources.with_mutations(path);
    }

    sources
}

/// Engine settings described by the arguments.
pub fn scan_config(args: &Cli) -> ScanConfig {
    ScanConfig::new()
        .with_threads(args.threads)
        .with_initial_region(args.region.as_str())
        .with_location_region(args.location_region.as_str())
        .with_write_check(!args.no_write_check)
        .with_retry(
            RetryConfig::new()
                .with_max_retries(args.max_retries)
                .with_worker_budget(args.retry_budget),
        )
}

/// S3 settings described by the arguments.
pub fn s3_config(args: &Cli) -> S3Config {
    let mut s3_config = S3Config::new()
        .with_anonymous(args.anonymous)
        .with_http_precheck(args.http_precheck)
        .with_timeouts(args.connect_timeout, args.read_timeout, args.request_timeout);

    if let Some(endpoint) = &args.s3_endpoint {
        s3_config = s3_config.with_endpoint(endpoint);
    }

    if let (Some(access_key), Some(secret_key)) = (&args.access_key, &args.secret_key) {
        s3_config = s3_config.with_credentials(access_key, secret_key);
        if let Some(token) = &args.session_token {
            s3_config = s3_config.with_session_token(token);
        }
    }

    if let Some(profile) = &args.profile {
        s3_config = s3_config.with_profile(profile);
    }

    s3_config
}

/// Execute a scan with the provided arguments.
pub async fn execute(args: Cli) -> Result<ScanReport> {
    // Pre-flight: every file is opened before any worker starts
    let sources = source_config(&args).open()?;
    let config = scan_config(&args);
    config.validate()?;

    let mut sink = FanoutSink::new()
        .with(ConsoleSink::stdout().with_diagnostics(args.show_diagnostics));
    if let Some(path) = &args.output {
        let csv = CsvSink::create(path)
            .with_context(|| format!("cannot open output file '{}'", path.display()))?;
        sink = sink.with(csv);
    }

    let client = S3StorageClient::new(s3_config(&args)).await?;

    let cancel = CancellationToken::new();
    let scanner = Scanner::new(config, Arc::new(client))?.with_cancellation(cancel.clone());

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, finishing in-flight probes");
            cancel.cancel();
        }
    });

    let mut progress =
        ProgressReporter::new(args.progress, args.progress_interval, scanner.stats().clone());
    progress.start();

    let report = scanner.run(sources, &mut sink).await?;

    progress.stop().await;
    info!(sink_errors = report.delivered.sink_errors, "Scan finished");

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["bucketprobe"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_scan_config_from_args() {
        let args = parse(&[
            "-i",
            "w.txt",
            "-t",
            "7",
            "--region",
            "eu-west-1",
            "--no-write-check",
            "--max-retries",
            "5",
        ]);
        let config = scan_config(&args);

        assert_eq!(config.threads, 7);
        assert_eq!(config.initial_region.as_str(), "eu-west-1");
        assert_eq!(config.location_region.as_str(), "us-west-2");
        assert!(!config.write_check);
        assert_eq!(config.retry.max_retries, 5);
    }

    #[test]
    fn test_domain_without_mutations_fails_preflight() {
        let args = parse(&["-d", "example.com"]);
        assert!(source_config(&args).validate().is_err());
    }

    #[test]
    fn test_s3_config_from_args() {
        let args = parse(&[
            "-i",
            "w.txt",
            "--s3-endpoint",
            "http://localhost:4566",
            "--anonymous",
            "--http-precheck",
        ]);
        let config = s3_config(&args);

        assert_eq!(config.endpoint.as_deref(), Some("http://localhost:4566"));
        assert!(config.anonymous);
        assert!(config.http_precheck);
    }

    #[tokio::test]
    async fn test_missing_wordlist_aborts_before_scanning() {
        let args = parse(&["-i", "/no/such/wordlist.txt"]);
        let err = execute(args).await.unwrap_err();
        assert!(err.to_string().contains("/no/such/wordlist.txt"));
    }
}
