#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

pub mod context;
pub mod domain;

// Re-export commonly used types at crate root
pub use context::{ContextError, RequestContext};
pub use domain::{
    BuildRunStatus, ChecksumAlgorithm, ChecksumResult, CompletionStatus, ExecutionProgress,
    PartitionError, UnknownAlgorithm, UploadOperation, check_partition,
};
