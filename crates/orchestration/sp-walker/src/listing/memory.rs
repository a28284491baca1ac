//! In-memory listing service.
//!
//! Derives delimited listings from a flat set of keys the same way S3 does:
//! everything after the prefix up to and including the next delimiter becomes
//! a common prefix, everything else is an object. Objects and common prefixes
//! share one lexicographic order and both count toward the page size.

use async_trait::async_trait;
use sp_error::ListingError;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Mutex;

use super::{DEFAULT_DELIMITER, ListingPage, ListingService};

/// Default page size, matching the S3 `MaxKeys` default.
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// A single request received by a [`MemoryListing`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// The prefix that was listed
    pub prefix: String,

    /// The continuation token sent with the request
    pub continuation_token: Option<String>,
}

/// An in-memory bucket implementing [`ListingService`].
///
/// Every request is recorded, which lets callers assert on the exact order
/// in which prefixes and pages were fetched.
#[derive(Debug)]
pub struct MemoryListing {
    bucket: String,
    keys: BTreeSet<String>,
    delimiter: String,
    page_size: usize,
    denied: HashSet<String>,
    denied_pages: HashSet<(String, String)>,
    failing: HashMap<String, (String, String)>,
    requests: Mutex<Vec<PageRequest>>,
}

impl MemoryListing {
    /// Create a bucket holding the given keys.
    pub fn new<I, K>(bucket: impl Into<String>, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self {
            bucket: bucket.into(),
            keys: keys.into_iter().map(Into::into).collect(),
            delimiter: DEFAULT_DELIMITER.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            denied: HashSet::new(),
            denied_pages: HashSet::new(),
            failing: HashMap::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Set the maximum number of entries per page (at least 1).
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Set the namespace delimiter.
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    /// Deny every listing request for exactly this prefix.
    pub fn deny_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.denied.insert(prefix.into());
        self
    }

    /// Deny only the request for `prefix` that carries `continuation_token`.
    ///
    /// Earlier pages of the prefix still list normally.
    pub fn deny_page(
        mut self,
        prefix: impl Into<String>,
        continuation_token: impl Into<String>,
    ) -> Self {
        self.denied_pages
            .insert((prefix.into(), continuation_token.into()));
        self
    }

    /// Fail every listing request for exactly this prefix with a service error.
    pub fn fail_prefix(
        mut self,
        prefix: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        self.failing
            .insert(prefix.into(), (code.into(), message.into()));
        self
    }

    /// All requests received so far, in order.
    pub fn requests(&self) -> Vec<PageRequest> {
        self.lock_requests().clone()
    }

    /// Number of requests received so far.
    pub fn request_count(&self) -> usize {
        self.lock_requests().len()
    }

    /// Prefixes in the order their first page was requested.
    pub fn listed_prefixes(&self) -> Vec<String> {
        self.lock_requests()
            .iter()
            .filter(|r| r.continuation_token.is_none())
            .map(|r| r.prefix.clone())
            .collect()
    }

    fn lock_requests(&self) -> std::sync::MutexGuard<'_, Vec<PageRequest>> {
        // A poisoned log is still a usable log
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Entries directly under `prefix`, keyed by name; `true` marks a common prefix.
    fn entries_under(&self, prefix: &str) -> BTreeMap<String, bool> {
        let mut entries = BTreeMap::new();

        for key in self.keys.range(prefix.to_string()..) {
            let Some(rest) = key.strip_prefix(prefix) else {
                break;
            };

            let split = if self.delimiter.is_empty() {
                None
            } else {
                rest.find(self.delimiter.as_str())
            };

            match split {
                Some(idx) => {
                    let end = prefix.len() + idx + self.delimiter.len();
                    entries.insert(key[..end].to_string(), true);
                }
                None => {
                    entries.insert(key.clone(), false);
                }
            }
        }

        entries
    }
}

#[async_trait]
impl ListingService for MemoryListing {
    async fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        continuation_token: Option<&str>,
    ) -> Result<ListingPage, ListingError> {
        self.lock_requests().push(PageRequest {
            prefix: prefix.to_string(),
            continuation_token: continuation_token.map(str::to_string),
        });

        if bucket != self.bucket {
            return Err(ListingError::service(
                prefix,
                "NoSuchBucket",
                format!("The specified bucket does not exist: {bucket}"),
            ));
        }

        let page_denied = continuation_token.is_some_and(|token| {
            self.denied_pages
                .contains(&(prefix.to_string(), token.to_string()))
        });

        if page_denied || self.denied.contains(prefix) {
            return Err(ListingError::denied(prefix, "Access Denied"));
        }

        if let Some((code, message)) = self.failing.get(prefix) {
            return Err(ListingError::service(prefix, code.clone(), message.clone()));
        }

        let start = match continuation_token {
            None => 0,
            Some(token) => token.parse::<usize>().map_err(|_| {
                ListingError::service(
                    prefix,
                    "InvalidArgument",
                    format!("The continuation token provided is incorrect: {token}"),
                )
            })?,
        };

        let entries = self.entries_under(prefix);
        let total = entries.len();
        let end = start.saturating_add(self.page_size).min(total);

        let mut page = ListingPage::default();
        for (name, is_prefix) in entries.into_iter().skip(start).take(end.saturating_sub(start)) {
            if is_prefix {
                page.sub_prefixes.push(name);
            } else {
                page.objects.push(name);
            }
        }

        if end < total {
            page.next_continuation_token = Some(end.to_string());
        }

        Ok(page)
    }

    fn delimiter(&self) -> &str {
        &self.delimiter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MemoryListing {
        MemoryListing::new(
            "bucket",
            [
                "root.txt",
                "a/",
                "a/b.txt",
                "a/c/d.csv",
                "x/y/z",
                "x/y/w.json",
            ],
        )
    }

    #[tokio::test]
    async fn test_root_listing_groups_by_delimiter() {
        let listing = sample();
        let page = listing.list_page("bucket", "", None).await.unwrap();

        assert_eq!(page.objects, vec!["root.txt"]);
        assert_eq!(page.sub_prefixes, vec!["a/", "x/"]);
        assert!(page.next_continuation_token.is_none());
    }

    #[tokio::test]
    async fn test_directory_marker_is_an_object_under_itself() {
        let listing = sample();
        let page = listing.list_page("bucket", "a/", None).await.unwrap();

        assert_eq!(page.objects, vec!["a/", "a/b.txt"]);
        assert_eq!(page.sub_prefixes, vec!["a/c/"]);
    }

    #[tokio::test]
    async fn test_pagination_counts_prefixes_and_objects() {
        let listing = sample().with_page_size(2);

        let first = listing.list_page("bucket", "", None).await.unwrap();
        assert_eq!(first.sub_prefixes, vec!["a/"]);
        assert_eq!(first.objects, vec!["root.txt"]);
        assert_eq!(first.next_continuation_token, Some("2".to_string()));

        let second = listing.list_page("bucket", "", Some("2")).await.unwrap();
        assert_eq!(second.sub_prefixes, vec!["x/"]);
        assert!(second.objects.is_empty());
        assert!(second.next_continuation_token.is_none());

        assert_eq!(
            listing.requests(),
            vec![
                PageRequest {
                    prefix: String::new(),
                    continuation_token: None,
                },
                PageRequest {
                    prefix: String::new(),
                    continuation_token: Some("2".to_string()),
                },
            ]
        );
        assert_eq!(listing.listed_prefixes(), vec![""]);
    }

    #[tokio::test]
    async fn test_deny_page_only_denies_that_page() {
        let listing = sample().with_page_size(1).deny_page("a/", "1");

        let first = listing.list_page("bucket", "a/", None).await.unwrap();
        assert_eq!(first.objects, vec!["a/"]);
        assert_eq!(first.next_continuation_token, Some("1".to_string()));

        let err = listing
            .list_page("bucket", "a/", Some("1"))
            .await
            .unwrap_err();
        assert!(matches!(err, ListingError::Denied { ref prefix, .. } if prefix == "a/"));

        let page = listing.list_page("bucket", "a/", Some("2")).await.unwrap();
        assert_eq!(page.sub_prefixes, vec!["a/c/"]);
    }

    #[tokio::test]
    async fn test_denied_and_failing_prefixes() {
        let listing = sample()
            .deny_prefix("a/")
            .fail_prefix("x/", "SlowDown", "Please reduce your request rate.");

        let err = listing.list_page("bucket", "a/", None).await.unwrap_err();
        assert!(matches!(err, ListingError::Denied { .. }));

        let err = listing.list_page("bucket", "x/", None).await.unwrap_err();
        assert!(matches!(err, ListingError::Service { ref code, .. } if code == "SlowDown"));

        assert_eq!(listing.request_count(), 2);
    }

    #[tokio::test]
    async fn test_unknown_bucket() {
        let listing = sample();
        let err = listing.list_page("other", "", None).await.unwrap_err();
        assert!(matches!(err, ListingError::Service { ref code, .. } if code == "NoSuchBucket"));
    }

    #[tokio::test]
    async fn test_invalid_token() {
        let listing = sample();
        let err = listing
            .list_page("bucket", "", Some("not-a-number"))
            .await
            .unwrap_err();
        assert!(matches!(err, ListingError::Service { ref code, .. } if code == "InvalidArgument"));
    }

    #[tokio::test]
    async fn test_custom_delimiter() {
        let listing = MemoryListing::new("bucket", ["a|b.txt", "c.txt"]).with_delimiter("|");
        let page = listing.list_page("bucket", "", None).await.unwrap();

        assert_eq!(page.objects, vec!["c.txt"]);
        assert_eq!(page.sub_prefixes, vec!["a|"]);
        assert_eq!(listing.delimiter(), "|");
    }
}
