//! Error types for API client operations.

use std::error::Error as StdError;
use std::io;

use asc_core::ContextError;
use thiserror::Error;

use crate::models::ApiErrorObject;
use crate::pagination::PaginationError;
use crate::retry::RetryError;

/// Result type alias for API client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors related to API operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The service answered with a non-2xx status.
    #[error("API request failed with status {status}: {url}{}", describe_errors(.errors))]
    ApiRequestFailed {
        /// HTTP status code
        status: u16,
        /// The URL that was requested
        url: String,
        /// Decoded JSON:API `errors` array (empty if the body was not one)
        errors: Vec<ApiErrorObject>,
    },

    /// A 2xx response that is not a JSON:API document.
    #[error("Invalid response from API: {message}")]
    InvalidResponse {
        /// Description of what was invalid
        message: String,
    },

    /// Network or HTTP client error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON parsing error.
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// The caller's context was cancelled or expired.
    #[error(transparent)]
    Context(#[from] ContextError),

    /// Pagination safeguard tripped.
    #[error(transparent)]
    Pagination(#[from] PaginationError),
}

impl ClientError {
    /// Whether this failure is a transient network blip worth retrying.
    ///
    /// Connection failures, resets, refusals, broken pipes and other
    /// transport-level errors are transient. Request timeouts and context
    /// errors reflect the caller's own deadline and are not; neither are API
    /// or decoding errors.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(err) => is_transient_network(err),
            _ => false,
        }
    }

    /// Tag this error for the retry executor.
    pub fn into_retry(self) -> RetryError<Self> {
        if self.is_transient() {
            RetryError::Retryable(self)
        } else {
            RetryError::Permanent(self)
        }
    }

    /// HTTP status for API errors.
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::ApiRequestFailed { status, .. } => Some(*status),
            _ => None,
        }
    }
}

fn is_transient_network(err: &reqwest::Error) -> bool {
    if err.is_timeout() || err.is_decode() || err.is_builder() || err.is_redirect() {
        return false;
    }
    if err.is_connect() {
        return true;
    }
    if let Some(kind) = io_error_kind(err) {
        return is_transient_io_kind(kind);
    }
    err.is_request() || err.is_body()
}

/// Find the first I/O error in the source chain.
fn io_error_kind(err: &(dyn StdError + 'static)) -> Option<io::ErrorKind> {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(e) = current {
        if let Some(io_err) = e.downcast_ref::<io::Error>() {
            return Some(io_err.kind());
        }
        current = e.source();
    }
    None
}

const fn is_transient_io_kind(kind: io::ErrorKind) -> bool {
    matches!(
        kind,
        io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionRefused
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::NotConnected
            | io::ErrorKind::UnexpectedEof
    )
}

fn describe_errors(errors: &[ApiErrorObject]) -> String {
    let messages: Vec<&str> = errors.iter().filter_map(ApiErrorObject::message).collect();
    if messages.is_empty() {
        String::new()
    } else {
        format!(" ({})", messages.join("; "))
    }
}
