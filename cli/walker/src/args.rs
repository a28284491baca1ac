//! CLI argument definitions for sp-walker.

use clap::{Parser, ValueEnum};

pub use sp_cli_common::LogLevel;

/// Find the first file visible in an S3 bucket.
///
/// Walks the bucket's `/`-delimited namespace depth first, scanning every page
/// of a prefix before entering its sub-prefixes, and prints the first key
/// whose name has a file extension. The report goes to stdout as JSON.
///
/// ## Examples
///
/// Anonymous walk of a public bucket:
///   sp-walker -b public-bucket --anonymous
///
/// Start below a prefix and stop at the first denied prefix:
///   sp-walker -b my-bucket -p logs/ --on-denied abort
///
/// Against LocalStack:
///   sp-walker -b test-bucket --s3-endpoint http://localhost:4566
#[derive(Parser, Debug)]
#[command(name = "sp-walker")]
#[command(version, about, long_about = None)]
pub struct Cli {
    // === S3 Configuration ===
    /// S3 bucket name
    #[arg(short, long, env = "SP_S3_BUCKET", value_parser = parse_bucket)]
    pub bucket: String,

    /// Prefix to start walking from (default: bucket root)
    #[arg(short, long, env = "SP_S3_PREFIX")]
    pub prefix: Option<String>,

    /// Custom S3 endpoint URL (for LocalStack)
    #[arg(long, env = "SP_S3_ENDPOINT")]
    pub s3_endpoint: Option<String>,

    /// AWS region
    #[arg(long, env = "AWS_REGION", default_value = "us-east-1")]
    pub region: String,

    /// AWS access key ID
    #[arg(long, env = "AWS_ACCESS_KEY_ID")]
    pub access_key: Option<String>,

    /// AWS secret access key
    #[arg(long, env = "AWS_SECRET_ACCESS_KEY")]
    pub secret_key: Option<String>,

    /// AWS profile name
    #[arg(long, env = "AWS_PROFILE")]
    pub profile: Option<String>,

    /// Send unsigned requests; credentials and profile are ignored
    #[arg(long)]
    pub anonymous: bool,

    /// Per-request timeout in seconds
    #[arg(long, default_value = "30", value_parser = parse_positive_u64)]
    pub timeout: u64,

    // === Walk Options ===
    /// What to do when listing a prefix is denied
    #[arg(long, value_enum, default_value = "skip")]
    pub on_denied: OnDenied,

    /// Keys per listing page (1-1000, default: service default)
    #[arg(long, value_parser = parse_page_size)]
    pub page_size: Option<i32>,

    /// Deepest sub-prefix level to descend into below the start prefix
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Retries for transient listing errors
    #[arg(long, default_value = "3")]
    pub max_retries: u32,

    // === Output Options ===
    /// Output format for the report
    #[arg(long, value_enum, default_value = "jsonl")]
    pub output_format: OutputFormatArg,

    // === Logging Options ===
    /// Log level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,
}

/// Denied-prefix policy argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OnDenied {
    /// Treat the denied prefix as empty and keep walking
    Skip,
    /// Stop the walk and fail
    Abort,
}

impl From<OnDenied> for sp_walker::DeniedPolicy {
    fn from(arg: OnDenied) -> Self {
        match arg {
            OnDenied::Skip => sp_walker::DeniedPolicy::Skip,
            OnDenied::Abort => sp_walker::DeniedPolicy::Abort,
        }
    }
}

/// Output format argument.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormatArg {
    /// JSON Lines (one JSON object per line)
    Jsonl,
    /// Pretty-printed JSON
    Json,
}

impl From<OutputFormatArg> for sp_walker::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Jsonl => sp_walker::OutputFormat::Jsonl,
            OutputFormatArg::Json => sp_walker::OutputFormat::Json,
        }
    }
}

/// Parse a non-empty bucket name, taken verbatim.
fn parse_bucket(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        return Err("bucket name must not be empty".to_string());
    }
    if s.trim() != s {
        return Err(format!(
            "bucket name '{s}' must not have leading or trailing whitespace"
        ));
    }
    Ok(s.to_string())
}

/// Parse a positive u64 (>= 1).
fn parse_positive_u64(s: &str) -> Result<u64, String> {
    let value: u64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if value < 1 {
        return Err(format!("{} is not in 1..", value));
    }
    Ok(value)
}

/// Parse a listing page size (1-1000).
fn parse_page_size(s: &str) -> Result<i32, String> {
    let value: i32 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if !(1..=1000).contains(&value) {
        return Err(format!("{} is not in 1..=1000", value));
    }
    Ok(value)
}
