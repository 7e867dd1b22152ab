//! CLI argument definitions for bucketprobe.

use bp_cli_common::LogLevel;
use bp_cli_common::args::parse_positive_usize;
use clap::Parser;
use std::path::PathBuf;

/// Enumerate S3 buckets from wordlists and domain mutations.
///
/// Every candidate name is probed with a zero-result listing. Buckets that
/// exist are printed to stdout with their region and whether they could be
/// listed and written to.
///
/// ## Examples
///
/// Wordlist only:
///   bucketprobe -i buckets.txt -o found.csv
///
/// Domain mutation with keywords:
///   bucketprobe -d example.com -m mutations.txt -k dev,prod,backup
///
/// Against LocalStack:
///   bucketprobe -i buckets.txt --s3-endpoint http://localhost:4566 --anonymous
#[derive(Parser, Debug)]
#[command(name = "bucketprobe")]
#[command(version, about, long_about = None)]
pub struct Cli {
    // === Candidate Sources ===
    /// Wordlist of bucket names, one per line
    #[arg(short = 'i', long = "wordlist")]
    pub wordlist: Option<PathBuf>,

    /// Domain to generate mutations for (e.g. example.com)
    #[arg(short, long)]
    pub domain: Option<String>,

    /// Mutation wordlist, required with --domain
    #[arg(short, long)]
    pub mutations: Option<PathBuf>,

    /// Keywords mixed into every mutation, separated by spaces or commas
    #[arg(short, long, value_delimiter = ',')]
    pub keywords: Vec<String>,

    // === Output ===
    /// Write found buckets to this CSV log, replacing it (name,region,listable,writable)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Also print abandoned probes to stdout
    #[arg(long)]
    pub show_diagnostics: bool,

    // === Probing ===
    /// Number of concurrent probe workers (must be >= 1)
    #[arg(short, long, default_value = "100", value_parser = parse_positive_usize)]
    pub threads: usize,

    /// Region every candidate is first probed in
    #[arg(long, default_value = "us-west-2")]
    pub region: String,

    /// Region bucket location lookups are sent to
    #[arg(long, default_value = "us-west-2")]
    pub location_region: String,

    /// Skip the write probe (buckets are reported as not writable)
    #[arg(long)]
    pub no_write_check: bool,

    /// Retries of a throttled request before it is abandoned
    #[arg(long, default_value = "3")]
    pub max_retries: u32,

    /// Backoff sleeps each worker may spend over the whole run
    #[arg(long, default_value = "24")]
    pub retry_budget: u32,

    /// Check existence with an unsigned HTTP request first
    #[arg(long)]
    pub http_precheck: bool,

    // === S3 Configuration ===
    /// Custom S3 endpoint URL (for LocalStack)
    #[arg(long, env = "BP_S3_ENDPOINT")]
    pub s3_endpoint: Option<String>,

    /// AWS access key ID
    #[arg(long, env = "AWS_ACCESS_KEY_ID", hide_env_values = true)]
    pub access_key: Option<String>,

    /// AWS secret access key
    #[arg(long, env = "AWS_SECRET_ACCESS_KEY", hide_env_values = true)]
    pub secret_key: Option<String>,

    /// AWS session token
    #[arg(long, env = "AWS_SESSION_TOKEN", hide_env_values = true)]
    pub session_token: Option<String>,

    /// AWS profile name
    #[arg(long, env = "AWS_PROFILE")]
    pub profile: Option<String>,

    /// Send unsigned requests
    #[arg(long)]
    pub anonymous: bool,

    /// Connect timeout in seconds
    #[arg(long, default_value = "5")]
    pub connect_timeout: u64,

    /// Read timeout in seconds
    #[arg(long, default_value = "10")]
    pub read_timeout: u64,

    /// Timeout for one request attempt in seconds
    #[arg(long, default_value = "20")]
    pub request_timeout: u64,

    // === Progress & Logging ===
    /// Print progress counters to stderr periodically
    #[arg(long)]
    pub progress: bool,

    /// Progress reporting interval in seconds
    #[arg(long, default_value = "5")]
    pub progress_interval: u64,

    /// Log level
    #[arg(long, value_enum, default_value = "warn")]
    pub log_level: LogLevel,
}

impl Cli {
    /// Keywords split on whitespace as well as commas, blanks dropped.
    pub fn keyword_list(&self) -> Vec<String> {
        self.keywords
            .iter()
            .flat_map(|k| k.split_whitespace())
            .map(str::to_string)
            .collect()
    }
}
