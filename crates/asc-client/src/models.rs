//! JSON:API document types.
//!
//! The service wraps every payload in a JSON:API document: single resources
//! under `data`, collections under `data` with a `links.next` cursor, errors
//! under `errors`.

use asc_core::{BuildRunStatus, CompletionStatus, ExecutionProgress};
use serde::{Deserialize, Serialize};

// ============================================================================
// Resources and documents
// ============================================================================

/// A typed resource object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource<A> {
    /// Resource type, e.g. `ciBuildRuns`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Resource ID.
    pub id: String,
    /// Resource attributes.
    pub attributes: A,
}

/// A single-resource document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document<T> {
    pub data: T,
}

/// Links attached to a collection page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLinks {
    /// The page's own address.
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
    /// Address of the following page; absent on the last page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

/// Paging metadata reported by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paging {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// Collection-level metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paging: Option<Paging>,
}

/// One page of a resource collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListDocument<T> {
    /// Resources in server order.
    pub data: Vec<T>,
    #[serde(default)]
    pub links: PageLinks,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<PageMeta>,
}

impl<T> ListDocument<T> {
    /// A page holding `data` and pointing at `next`.
    pub fn new(data: Vec<T>, next: Option<String>) -> Self {
        Self {
            data,
            links: PageLinks {
                self_link: None,
                next,
            },
            meta: None,
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// One entry of a JSON:API `errors` array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorObject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ApiErrorObject {
    /// Most specific human-readable text available.
    pub fn message(&self) -> Option<&str> {
        self.detail
            .as_deref()
            .or(self.title.as_deref())
            .or(self.code.as_deref())
    }
}

/// Body of a non-2xx response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorDocument {
    #[serde(default)]
    pub errors: Vec<ApiErrorObject>,
}

// ============================================================================
// Build runs
// ============================================================================

/// Attributes of a `ciBuildRuns` resource that the poller needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CiBuildRunAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_date: Option<String>,
    pub execution_progress: ExecutionProgress,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_status: Option<CompletionStatus>,
}

impl From<Resource<CiBuildRunAttributes>> for BuildRunStatus {
    fn from(resource: Resource<CiBuildRunAttributes>) -> Self {
        Self::new(
            resource.id,
            resource.attributes.execution_progress,
            resource.attributes.completion_status,
        )
    }
}
