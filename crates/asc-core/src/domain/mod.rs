//! Domain value types shared by the client, transfer and CLI crates.

mod build_run;
mod checksum;
mod upload;

pub use build_run::{BuildRunStatus, CompletionStatus, ExecutionProgress};
pub use checksum::{ChecksumAlgorithm, ChecksumResult, UnknownAlgorithm};
pub use upload::{PartitionError, UploadOperation, check_partition};
