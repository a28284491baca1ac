//! S3 client and listing functionality.
//!
//! This module provides the S3 side of the prefix walker:
//! - Client configuration with LocalStack and anonymous access support
//! - A delimited, paginated [`ListingService`](crate::ListingService) implementation
//! - Exponential backoff for transient service errors

mod client;
mod lister;
mod retry;

pub use client::{S3Config, create_s3_client};
pub use lister::{S3Lister, is_denied_code};
pub use retry::{RetryConfig, with_retry};
