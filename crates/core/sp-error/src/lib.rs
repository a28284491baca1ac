//! Error types and classification for s3-probe.
//!
//! This crate provides:
//! - [`SpError`] - Top-level error enum for walker and CLI errors
//! - [`ListingError`] - Failures reported by a listing service for one prefix
//! - [`ErrorCategory`] for retry decisions
//! - Classification of listing errors by service error code

use thiserror::Error;

/// Top-level error type for s3-probe.
#[derive(Error, Debug)]
pub enum SpError {
    /// Listing errors (access denied, service failures)
    #[error("Listing error: {0}")]
    Listing(#[from] ListingError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Output errors (serialization, stdout)
    #[error("Output error: {0}")]
    Output(String),
}

impl SpError {
    /// Returns true if this error is an access denial from the listing service.
    pub fn is_denied(&self) -> bool {
        matches!(self, SpError::Listing(ListingError::Denied { .. }))
    }
}

/// Errors raised by a listing service while enumerating a single prefix.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ListingError {
    /// The service refused to enumerate the prefix.
    #[error("Access denied listing prefix '{prefix}': {message}")]
    Denied { prefix: String, message: String },

    /// Any other service-boundary failure (throttling, 5xx, network, missing bucket).
    #[error("Listing prefix '{prefix}' failed ({code}): {message}")]
    Service {
        prefix: String,
        code: String,
        message: String,
    },
}

impl ListingError {
    /// Create an access-denied error for a prefix.
    pub fn denied(prefix: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Denied {
            prefix: prefix.into(),
            message: message.into(),
        }
    }

    /// Create a service error for a prefix.
    pub fn service(
        prefix: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Service {
            prefix: prefix.into(),
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Error classification for retry decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Transient error - retry with exponential backoff
    ///
    /// Examples: SlowDown, 503, connection reset, request timeout
    Transient,

    /// Permanent error - never retry
    ///
    /// Examples: access denied, missing bucket, invalid request
    Permanent,
}

/// Classifies a listing error to determine retry behavior.
///
/// Denials are always permanent. Service errors are classified by their
/// error code and message; unknown failures are treated as transient.
pub fn classify_listing_error(error: &ListingError) -> ErrorCategory {
    match error {
        ListingError::Denied { .. } => ErrorCategory::Permanent,
        ListingError::Service { code, message, .. } => classify_service_code(code, message),
    }
}

fn classify_service_code(code: &str, message: &str) -> ErrorCategory {
    let code_lower = code.to_lowercase();
    let message_lower = message.to_lowercase();

    if code_lower.contains("slowdown")
        || code_lower.contains("throttl")
        || code_lower.contains("toomanyrequests")
        || code_lower.contains("internalerror")
        || code_lower.contains("serviceunavailable")
        || code_lower.contains("requesttimeout")
        || message_lower.contains("timeout")
        || message_lower.contains("connection reset")
        || message_lower.contains("connection refused")
        || message_lower.contains("dispatch failure")
    {
        return ErrorCategory::Transient;
    }

    if code_lower.contains("nosuchbucket")
        || code_lower.starts_with("invalid")
        || code_lower.contains("permanentredirect")
        || code_lower.contains("authorizationheadermalformed")
        || code_lower.contains("signaturedoesnotmatch")
        || code_lower.contains("requesttimetooskewed")
    {
        return ErrorCategory::Permanent;
    }

    // Numeric codes come through when the service returned a bare HTTP status
    if let Ok(status) = code.parse::<u16>() {
        return if status == 429 || status >= 500 {
            ErrorCategory::Transient
        } else {
            ErrorCategory::Permanent
        };
    }

    ErrorCategory::Transient
}

/// Result type alias using SpError.
pub type Result<T> = std::result::Result<T, SpError>;
