//! Output of walk reports.
//!
//! Reports go to stdout so they can be piped to tools like `jq`; logs and the
//! human-readable summary go to stderr.

mod stdout;

pub use stdout::{OutputFormat, StdoutOutput};
