//! Main execution logic for sp-walker CLI.

use anyhow::Result;
use sp_walker::{
    PrefixWalker, RetryConfig, S3Config, S3Lister, StdoutOutput, WalkReport, WalkerConfig,
    create_s3_client,
};
use tracing::{debug, info};

use crate::args::Cli;

/// Build the S3 configuration from CLI arguments.
///
/// Anonymous access drops any credentials or profile picked up from the
/// environment.
pub fn build_s3_config(args: &Cli) -> S3Config {
    let mut s3_config = S3Config::new(&args.bucket)
        .with_region(&args.region)
        .with_timeout(args.timeout)
        .with_anonymous(args.anonymous);

    if let Some(prefix) = &args.prefix {
        s3_config = s3_config.with_prefix(prefix);
    }

    if let Some(endpoint) = &args.s3_endpoint {
        s3_config = s3_config.with_endpoint(endpoint);
    }

    if args.anonymous {
        if args.access_key.is_some() || args.profile.is_some() {
            debug!("Anonymous access requested, ignoring credentials and profile");
        }
        return s3_config;
    }

    if let (Some(access_key), Some(secret_key)) = (&args.access_key, &args.secret_key) {
        s3_config = s3_config.with_credentials(access_key, secret_key);
    }

    if let Some(profile) = &args.profile {
        s3_config = s3_config.with_profile(profile);
    }

    s3_config
}

/// Build the walker configuration from CLI arguments.
pub fn build_walker_config(args: &Cli) -> WalkerConfig {
    let config = WalkerConfig::new().with_denied_policy(args.on_denied.into());

    match args.max_depth {
        Some(max_depth) => config.with_max_depth(max_depth),
        None => config,
    }
}

/// Execute the walker with the provided arguments.
pub async fn execute(args: Cli) -> Result<WalkReport> {
    let s3_config = build_s3_config(&args);
    let s3_client = create_s3_client(&s3_config).await?;

    let mut lister = S3Lister::new(s3_client)
        .with_retry(RetryConfig::new().with_max_retries(args.max_retries));
    if let Some(page_size) = args.page_size {
        lister = lister.with_page_size(page_size);
    }

    info!(
        bucket = %s3_config.bucket,
        prefix = %s3_config.start_prefix(),
        anonymous = s3_config.anonymous,
        "Walking bucket"
    );

    let walker = PrefixWalker::new(lister, &s3_config.bucket, build_walker_config(&args));
    let report = walker.walk(s3_config.start_prefix()).await?;

    StdoutOutput::new(args.output_format.into()).write(&report)?;

    Ok(report)
}
