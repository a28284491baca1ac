//! sp-walker - S3 prefix walking for s3-probe.
//!
//! This crate finds the first file in an object-storage bucket by walking
//! its delimited namespace. It provides:
//!
//! - A [`ListingService`] seam with S3 and in-memory implementations
//! - [`PrefixWalker`], a sequential depth-first traversal that scans every
//!   page of a prefix before descending into its sub-prefixes
//! - An explicit [`DeniedPolicy`] for prefixes the caller may not list
//! - Retry with backoff for transient S3 errors, and walk statistics
//!
//! # Example
//!
//! ```ignore
//! use sp_walker::{PrefixWalker, S3Config, S3Lister, WalkerConfig, create_s3_client};
//!
//! let s3_config = S3Config::new("my-bucket").with_anonymous(true);
//! let client = create_s3_client(&s3_config).await?;
//!
//! let walker = PrefixWalker::new(S3Lister::new(client), "my-bucket", WalkerConfig::new());
//!
//! match walker.find_first_file_key("").await? {
//!     Some(key) => println!("first file: {key}"),
//!     None => println!("no files visible"),
//! }
//! ```

pub mod config;
pub mod listing;
pub mod output;
pub mod s3;
pub mod stats;
pub mod walker;

pub use config::{DeniedPolicy, WalkerConfig};
pub use listing::{ListingPage, ListingService, MemoryListing, PageRequest};
pub use output::{OutputFormat, StdoutOutput};
pub use s3::{RetryConfig, S3Config, S3Lister, create_s3_client};
pub use stats::WalkStats;
pub use walker::{PrefixWalker, WalkReport, find_first_file_key, is_file_key};
