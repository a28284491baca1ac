//! Listing service abstraction.
//!
//! This module provides the [`ListingService`] trait consumed by the prefix
//! walker and the page type it returns:
//! - [`S3Lister`](crate::s3::S3Lister) - Lists a real S3 bucket with ListObjectsV2
//! - [`MemoryListing`] - An in-memory bucket for tests and demos

pub mod memory;

pub use memory::{MemoryListing, PageRequest};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sp_error::ListingError;

/// The default namespace delimiter.
pub const DEFAULT_DELIMITER: &str = "/";

/// One page of a delimited listing for a (bucket, prefix) pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingPage {
    /// Object keys directly under the prefix, in service order
    pub objects: Vec<String>,

    /// Narrower prefixes ("subdirectories") under the prefix, in service order
    pub sub_prefixes: Vec<String>,

    /// Token for the next page; absent on the last page
    pub next_continuation_token: Option<String>,
}

impl ListingPage {
    /// Create a final page with the given objects and sub-prefixes.
    pub fn new(objects: Vec<String>, sub_prefixes: Vec<String>) -> Self {
        Self {
            objects,
            sub_prefixes,
            next_continuation_token: None,
        }
    }

    /// Set the continuation token for the following page.
    pub fn with_next_token(mut self, token: impl Into<String>) -> Self {
        self.next_continuation_token = Some(token.into());
        self
    }
}

/// A paginated, delimited listing of a bucket's hierarchical namespace.
///
/// Implementations issue one request per call. Timeouts and retries are the
/// implementation's concern; any error returned here is final for that page.
#[async_trait]
pub trait ListingService: Send + Sync {
    /// Fetch one page of entries under `prefix`.
    ///
    /// `continuation_token` is `None` for the first page and the previous
    /// page's `next_continuation_token` afterwards.
    async fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        continuation_token: Option<&str>,
    ) -> Result<ListingPage, ListingError>;

    /// The delimiter used to derive sub-prefixes from keys.
    fn delimiter(&self) -> &str {
        DEFAULT_DELIMITER
    }
}

#[async_trait]
impl<T: ListingService + ?Sized> ListingService for &T {
    async fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        continuation_token: Option<&str>,
    ) -> Result<ListingPage, ListingError> {
        (**self).list_page(bucket, prefix, continuation_token).await
    }

    fn delimiter(&self) -> &str {
        (**self).delimiter()
    }
}
