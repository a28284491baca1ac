//! Depth-first prefix walker.
//!
//! Finds the first object in a bucket whose final key segment carries a file
//! extension. Every page of a prefix is scanned before any sub-prefix found on
//! those pages is entered; sub-prefixes are then explored depth first in the
//! order the service returned them.

use serde::{Deserialize, Serialize};
use sp_error::{ListingError, Result, SpError};
use std::collections::HashSet;
use tracing::{debug, warn};

use crate::config::{DeniedPolicy, WalkerConfig};
use crate::listing::ListingService;
use crate::stats::WalkStats;

/// Returns true if `key` names a file: it does not end in the delimiter and
/// its final segment contains a `.`.
pub fn is_file_key(key: &str, delimiter: &str) -> bool {
    if key.is_empty() {
        return false;
    }

    if delimiter.is_empty() {
        return key.contains('.');
    }

    if key.ends_with(delimiter) {
        return false;
    }

    key.rsplit(delimiter)
        .next()
        .is_some_and(|segment| segment.contains('.'))
}

/// Outcome of a prefix walk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalkReport {
    /// The bucket that was walked
    pub bucket: String,

    /// The prefix the walk started from
    pub start_prefix: String,

    /// The first file key found, if any
    pub key: Option<String>,

    /// Statistics for the walk
    pub stats: WalkStats,
}

impl WalkReport {
    /// The S3 URI of the found key (e.g., "s3://bucket/path/file.txt").
    pub fn uri(&self) -> Option<String> {
        self.key
            .as_ref()
            .map(|key| format!("s3://{}/{}", self.bucket, key))
    }
}

/// Result of scanning every page of one prefix.
enum PrefixScan {
    /// A file key was found on one of the pages
    Found(String),
    /// No file on any page; the collected sub-prefixes in service order
    Exhausted(Vec<String>),
}

/// Walks a bucket's namespace through a [`ListingService`].
///
/// Requests are issued one at a time. Pending sub-prefixes live on an
/// explicit stack, so namespace depth never grows the call stack.
pub struct PrefixWalker<L: ListingService> {
    listing: L,
    bucket: String,
    config: WalkerConfig,
}

impl<L: ListingService> PrefixWalker<L> {
    /// Create a new walker.
    ///
    /// # Arguments
    ///
    /// * `listing` - The listing service to query
    /// * `bucket` - The bucket to walk
    /// * `config` - The walker configuration
    pub fn new(listing: L, bucket: impl Into<String>, config: WalkerConfig) -> Self {
        Self {
            listing,
            bucket: bucket.into(),
            config,
        }
    }

    /// The listing service this walker queries.
    pub fn listing(&self) -> &L {
        &self.listing
    }

    /// Find the first file key at or below `start_prefix`.
    ///
    /// An empty prefix walks the whole bucket.
    pub async fn find_first_file_key(&self, start_prefix: &str) -> Result<Option<String>> {
        Ok(self.walk(start_prefix).await?.key)
    }

    /// Walk from `start_prefix` and report the first file key with statistics.
    pub async fn walk(&self, start_prefix: &str) -> Result<WalkReport> {
        if self.bucket.is_empty() {
            return Err(SpError::Config("bucket name must not be empty".to_string()));
        }

        let mut stats = WalkStats::new();

        debug!(
            bucket = %self.bucket,
            start_prefix = %start_prefix,
            denied_policy = ?self.config.denied_policy,
            max_depth = ?self.config.max_depth,
            "Starting prefix walk"
        );

        let key = self.search(start_prefix, &mut stats).await?;
        stats.complete();

        debug!(
            key = ?key,
            pages = stats.pages_fetched,
            prefixes = stats.prefixes_visited,
            objects = stats.objects_scanned,
            denied = stats.denied_prefixes.len(),
            "Prefix walk completed"
        );

        Ok(WalkReport {
            bucket: self.bucket.clone(),
            start_prefix: start_prefix.to_string(),
            key,
            stats,
        })
    }

    async fn search(&self, start_prefix: &str, stats: &mut WalkStats) -> Result<Option<String>> {
        // (prefix, depth below start); the top of the stack is explored next
        let mut pending: Vec<(String, usize)> = vec![(start_prefix.to_string(), 0)];

        while let Some((prefix, depth)) = pending.pop() {
            stats.record_prefix();

            match self.scan_prefix(&prefix, stats).await {
                Ok(PrefixScan::Found(key)) => {
                    debug!(key = %key, prefix = %prefix, "Found file key");
                    return Ok(Some(key));
                }
                Ok(PrefixScan::Exhausted(sub_prefixes)) => {
                    let children = self.descendable(&prefix, depth, sub_prefixes, stats);
                    pending.extend(children.into_iter().rev().map(|p| (p, depth + 1)));
                }
                Err(ListingError::Denied { message, .. })
                    if self.config.denied_policy == DeniedPolicy::Skip =>
                {
                    warn!(
                        bucket = %self.bucket,
                        prefix = %prefix,
                        error = %message,
                        "Access denied listing prefix, skipping subtree"
                    );
                    stats.record_denied(&prefix);
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(None)
    }

    /// Fetch every page of `prefix`, stopping at the first file key.
    async fn scan_prefix(
        &self,
        prefix: &str,
        stats: &mut WalkStats,
    ) -> std::result::Result<PrefixScan, ListingError> {
        let delimiter = self.listing.delimiter();
        let mut sub_prefixes = Vec::new();
        let mut continuation_token: Option<String> = None;
        // Every token sent for this prefix; a repeat means the service is cycling
        let mut tokens_sent: HashSet<String> = HashSet::new();

        loop {
            let page = self
                .listing
                .list_page(&self.bucket, prefix, continuation_token.as_deref())
                .await?;

            debug!(
                prefix = %prefix,
                objects = page.objects.len(),
                sub_prefixes = page.sub_prefixes.len(),
                truncated = page.next_continuation_token.is_some(),
                "Listed page"
            );

            let found = page
                .objects
                .iter()
                .position(|key| is_file_key(key, delimiter));

            match found {
                Some(idx) => {
                    stats.record_page(idx + 1);
                    let mut objects = page.objects;
                    return Ok(PrefixScan::Found(objects.swap_remove(idx)));
                }
                None => stats.record_page(page.objects.len()),
            }

            sub_prefixes.extend(page.sub_prefixes);

            match page.next_continuation_token {
                Some(next) if tokens_sent.contains(&next) => {
                    warn!(
                        prefix = %prefix,
                        token = %next,
                        "Listing returned an already used continuation token, ending prefix"
                    );
                    break;
                }
                Some(next) => {
                    tokens_sent.insert(next.clone());
                    continuation_token = Some(next);
                }
                None => break,
            }
        }

        Ok(PrefixScan::Exhausted(sub_prefixes))
    }

    /// Filter sub-prefixes of `parent` down to the ones the walk may enter.
    fn descendable(
        &self,
        parent: &str,
        depth: usize,
        sub_prefixes: Vec<String>,
        stats: &mut WalkStats,
    ) -> Vec<String> {
        let children: Vec<String> = sub_prefixes
            .into_iter()
            .filter(|child| {
                let strict = child.len() > parent.len() && child.starts_with(parent);
                if !strict {
                    warn!(
                        parent = %parent,
                        sub_prefix = %child,
                        "Sub-prefix does not extend its parent, ignoring"
                    );
                }
                strict
            })
            .collect();

        match self.config.max_depth {
            Some(max_depth) if depth >= max_depth => {
                if !children.is_empty() {
                    debug!(
                        parent = %parent,
                        skipped = children.len(),
                        max_depth,
                        "Depth limit reached"
                    );
                    stats.record_beyond_depth(children.len());
                }
                Vec::new()
            }
            _ => children,
        }
    }
}

/// Find the first file key at or below `start_prefix` in `bucket`.
///
/// Convenience wrapper around [`PrefixWalker`] that borrows the listing
/// service, so callers can inspect it afterwards.
pub async fn find_first_file_key<L: ListingService>(
    listing: &L,
    bucket: &str,
    start_prefix: &str,
    config: &WalkerConfig,
) -> Result<Option<String>> {
    PrefixWalker::new(listing, bucket, config.clone())
        .find_first_file_key(start_prefix)
        .await
}
