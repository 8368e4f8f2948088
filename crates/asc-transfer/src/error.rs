//! Error types for transfer operations.

use std::io;
use std::path::{Path, PathBuf};

use asc_core::ContextError;
use thiserror::Error;

/// Result type alias for transfer operations.
pub type TransferResult<T> = Result<T, TransferError>;

/// Errors raised while moving file bytes to or from the network.
#[derive(Debug, Error)]
pub enum TransferError {
    /// Local filesystem failure.
    #[error("Failed to {operation} {}: {source}", path.display())]
    Io {
        /// What was being attempted, e.g. `open` or `write`.
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The source file holds fewer bytes than an upload operation addresses.
    #[error(
        "Short read at offset {offset}: expected {expected} bytes, got {actual} (file changed after upload was reserved?)"
    )]
    ShortRead {
        offset: u64,
        expected: u64,
        actual: u64,
    },

    /// A chunk destination answered with a non-2xx status.
    #[error("Upload rejected with status {status}: {url}")]
    UploadRejected {
        status: u16,
        /// Destination with its query string removed.
        url: String,
    },

    /// A download source answered with a non-2xx status.
    #[error("Download failed with status {status}: {url}")]
    DownloadFailed { status: u16, url: String },

    /// Network or HTTP client error, with any URL stripped.
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// An upload operation that cannot be turned into a request.
    #[error("Invalid upload operation: {0}")]
    InvalidOperation(String),

    /// The caller's context was cancelled or expired.
    #[error(transparent)]
    Context(#[from] ContextError),

    /// Destination is a symlink and overwrite was not requested.
    #[error("Refusing to write through symlink {}", .0.display())]
    SymlinkRefused(PathBuf),

    /// Destination is a directory.
    #[error("Destination {} is a directory", .0.display())]
    IsDirectory(PathBuf),

    /// Destination exists and overwrite was not requested.
    #[error("Destination {} already exists", .0.display())]
    AlreadyExists(PathBuf),

    /// A background task panicked or was aborted.
    #[error("Background task failed: {0}")]
    TaskFailed(String),
}

// Transfer URLs are pre-signed; the error must not carry their credentials.
impl From<reqwest::Error> for TransferError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.without_url())
    }
}

impl TransferError {
    /// Wrap an I/O error with the operation and path it concerns.
    pub fn io(operation: &'static str, path: impl AsRef<Path>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}
