//! Delimited S3 listing with pagination and retries.

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::operation::list_objects_v2::ListObjectsV2Error;
use sp_error::{ListingError, classify_listing_error};
use tracing::debug;

use super::retry::{RetryConfig, with_retry};
use crate::listing::{DEFAULT_DELIMITER, ListingPage, ListingService};

/// S3 error codes that mean the caller may not list the bucket.
const DENIED_CODES: &[&str] = &["AccessDenied", "AllAccessDisabled"];

/// Returns true if an S3 error is an access denial.
///
/// A service error code decides on its own; HTTP 403 only counts when the
/// service sent no code (e.g. a bare 403 with no body).
pub fn is_denied_code(code: Option<&str>, status: Option<u16>) -> bool {
    match code {
        Some(code) => DENIED_CODES.contains(&code),
        None => status == Some(403),
    }
}

/// [`ListingService`] backed by S3 `ListObjectsV2` with a delimiter.
///
/// Transient failures (throttling, 5xx, dispatch errors) are retried per the
/// [`RetryConfig`]; denials and other permanent failures are returned at once.
#[derive(Debug, Clone)]
pub struct S3Lister {
    client: Client,
    delimiter: String,
    page_size: Option<i32>,
    retry: RetryConfig,
}

impl S3Lister {
    /// Create a lister with the default `/` delimiter and service page size.
    pub fn new(client: Client) -> Self {
        Self {
            client,
            delimiter: DEFAULT_DELIMITER.to_string(),
            page_size: None,
            retry: RetryConfig::default(),
        }
    }

    /// Set the namespace delimiter.
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    /// Set `MaxKeys` for each request.
    pub fn with_page_size(mut self, page_size: i32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Set the retry configuration.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    async fn fetch(
        &self,
        bucket: &str,
        prefix: &str,
        continuation_token: Option<&str>,
    ) -> Result<ListingPage, ListingError> {
        let mut req = self.client.list_objects_v2().bucket(bucket);

        if !prefix.is_empty() {
            req = req.prefix(prefix);
        }

        if !self.delimiter.is_empty() {
            req = req.delimiter(&self.delimiter);
        }

        if let Some(token) = continuation_token {
            req = req.continuation_token(token);
        }

        if let Some(page_size) = self.page_size {
            req = req.max_keys(page_size);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| listing_error_from_sdk(prefix, &e))?;

        let objects = resp
            .contents()
            .iter()
            .filter_map(|obj| obj.key().map(str::to_string))
            .collect();

        let sub_prefixes = resp
            .common_prefixes()
            .iter()
            .filter_map(|cp| cp.prefix().map(str::to_string))
            .collect();

        let next_continuation_token = if resp.is_truncated() == Some(true) {
            resp.next_continuation_token().map(str::to_string)
        } else {
            None
        };

        Ok(ListingPage {
            objects,
            sub_prefixes,
            next_continuation_token,
        })
    }
}

#[async_trait]
impl ListingService for S3Lister {
    async fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        continuation_token: Option<&str>,
    ) -> Result<ListingPage, ListingError> {
        debug!(
            bucket = %bucket,
            prefix = %prefix,
            continuation = continuation_token.is_some(),
            "ListObjectsV2"
        );

        with_retry(&self.retry, "list_objects_v2", classify_listing_error, move || {
            self.fetch(bucket, prefix, continuation_token)
        })
        .await
    }

    fn delimiter(&self) -> &str {
        &self.delimiter
    }
}

/// Convert an SDK failure into a [`ListingError`] for `prefix`.
///
/// Service errors keep their S3 error code; dispatch, timeout and other
/// client-side failures use `N/A` with the full error chain as the message.
fn listing_error_from_sdk(prefix: &str, err: &SdkError<ListObjectsV2Error>) -> ListingError {
    let status = err.raw_response().map(|r| r.status().as_u16());

    match err.as_service_error() {
        Some(service_err) => {
            let denied = is_denied_code(service_err.code(), status);
            let code = service_err
                .code()
                .map(str::to_string)
                .or_else(|| status.map(|s| s.to_string()))
                .unwrap_or_else(|| "unknown".to_string());
            let message = service_err.message().unwrap_or("no message").to_string();

            if denied {
                ListingError::denied(prefix, format!("{code}: {message}"))
            } else {
                ListingError::service(prefix, code, message)
            }
        }
        None => {
            let message = DisplayErrorContext(err).to_string();
            if status == Some(403) {
                ListingError::denied(prefix, message)
            } else {
                ListingError::service(prefix, "N/A", message)
            }
        }
    }
}
