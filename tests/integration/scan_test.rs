//! Full scan integration tests using LocalStack.

use crate::common::{LocalStackTestContext, unique_name};
use bp_scanner::sink::{CollectingSink, CsvSink, FanoutSink};
use bp_scanner::{S3StorageClient, ScanConfig, Scanner, SourceConfig};
use std::io::Write;
use std::sync::Arc;

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_scan_finds_only_existing_buckets() {
    let ctx = LocalStackTestContext::new().await;

    if !ctx.is_available().await {
        eprintln!("LocalStack not available, skipping test");
        return;
    }

    let present = unique_name("bp-present");
    let absent = unique_name("bp-absent");
    ctx.create_bucket(&present).await.unwrap();

    let mut wordlist = tempfile::NamedTempFile::new().unwrap();
    writeln!(wordlist, "{present}").unwrap();
    writeln!(wordlist).unwrap();
    writeln!(wordlist, "{absent}").unwrap();

    let sources = SourceConfig::new()
        .with_wordlist(wordlist.path())
        .open()
        .unwrap();

    let storage = S3StorageClient::new(ctx.adapter_config()).await.unwrap();
    let config = ScanConfig::new()
        .with_threads(4)
        .with_initial_region(ctx.region.as_str());
    let scanner = Scanner::new(config, Arc::new(storage)).unwrap();

    let mut sink = CollectingSink::new();
    let report = scanner.run(sources, &mut sink).await.unwrap();

    assert_eq!(sink.names(), vec![present.as_str()]);
    let found = &sink.results()[0];
    assert!(found.listable);
    assert!(found.writable);
    assert_eq!(report.stats.candidates, 2);
    assert_eq!(report.stats.not_found, 1);
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_scan_writes_csv_log() {
    let ctx = LocalStackTestContext::new().await;

    if !ctx.is_available().await {
        eprintln!("LocalStack not available, skipping test");
        return;
    }

    let bucket = unique_name("bp-logged");
    ctx.create_bucket(&bucket).await.unwrap();

    let mut wordlist = tempfile::NamedTempFile::new().unwrap();
    writeln!(wordlist, "{bucket}").unwrap();
    let log = tempfile::NamedTempFile::new().unwrap();

    let sources = SourceConfig::new()
        .with_wordlist(wordlist.path())
        .open()
        .unwrap();
    let storage = S3StorageClient::new(ctx.adapter_config()).await.unwrap();
    let config = ScanConfig::new()
        .with_threads(2)
        .with_initial_region(ctx.region.as_str())
        .with_write_check(false);
    let scanner = Scanner::new(config, Arc::new(storage)).unwrap();

    let mut sink = FanoutSink::new().with(CsvSink::create(log.path()).unwrap());
    scanner.run(sources, &mut sink).await.unwrap();

    let text = std::fs::read_to_string(log.path()).unwrap();
    assert_eq!(text, format!("{bucket},us-east-1,true,false\n"));
}
