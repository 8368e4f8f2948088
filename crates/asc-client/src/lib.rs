#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

mod client;
mod config;
mod error;
mod http;
mod models;
mod pagination;
mod poll;
mod retry;
mod url;

// ============================================================================
// Public API
// ============================================================================

// Client
pub use client::{ApiClient, DefaultApiClient};

// Configuration
pub use config::{ApiClientConfig, DEFAULT_BASE_URL};

// Errors
pub use error::{ClientError, ClientResult};

// Transport
pub use http::{HttpBackend, ReqwestBackend};

// JSON:API models
pub use models::{
    ApiErrorDocument, ApiErrorObject, CiBuildRunAttributes, Document, ListDocument, PageLinks,
    PageMeta, Paging, Resource,
};

// Pagination
pub use pagination::{DEFAULT_MAX_PAGES, Page, PaginationError, PaginationOptions, aggregate};

// Completion polling
pub use poll::{MIN_POLL_INTERVAL, WaitError, wait_for_completion};

// Retry
pub use retry::{InvalidRetryPolicy, RetryError, RetryPolicy, execute};

// URL helpers
pub use self::url::{MAX_PAGE_LIMIT, build_resource_url, resolve_next_link, with_limit};
