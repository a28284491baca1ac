//! Logging initialization utilities.

use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

use crate::LogLevel;

/// AWS SDK internals are only interesting when explicitly asked for.
const QUIET_DEPENDENCIES: &[&str] = &["aws_config=warn", "aws_smithy_runtime=warn", "hyper=warn"];

/// Build the filter for `level`, letting `RUST_LOG` override it when set.
pub fn build_filter(level: LogLevel) -> Result<EnvFilter> {
    if let Ok(env) = std::env::var(EnvFilter::DEFAULT_ENV) {
        return EnvFilter::try_new(&env).map_err(|e| anyhow!("Invalid RUST_LOG '{env}': {e}"));
    }

    let mut filter = EnvFilter::new(level.as_directive());
    for directive in QUIET_DEPENDENCIES {
        filter = filter.add_directive(directive.parse()?);
    }
    Ok(filter)
}

/// Initialize logging with the specified level.
///
/// Logs are written to stderr so stdout remains clean for program output.
pub fn init_logging(level: LogLevel) -> Result<()> {
    fmt::Subscriber::builder()
        .with_env_filter(build_filter(level)?)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logging: {e}"))
}
