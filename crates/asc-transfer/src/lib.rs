#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

mod checksum;
mod download;
mod error;
mod fs;
mod transport;
mod upload;

// ============================================================================
// Public API
// ============================================================================

// Upload
pub use transport::{ChunkTransport, ReqwestChunkTransport};
pub use upload::{DEFAULT_UPLOAD_CONCURRENCY, UploadConfig, UploadExecutor, UploadReport};

// Checksum
pub use checksum::checksum;

// Safe file output
pub use download::Downloader;
pub use fs::{check_destination, write_stream_atomically};

// Errors
pub use error::{TransferError, TransferResult};
