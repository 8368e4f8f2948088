//! CLI-specific error types and exit code mapping.
//!
//! Handlers return `anyhow::Error`; [`exit_code`] walks its cause chain for
//! the first error it recognises and maps it to a sysexits-style code.

use asc_client::ClientError;
use asc_core::ContextError;
use asc_transfer::TransferError;
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Argument that clap could not validate on its own.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// Input file contents that do not make sense.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error (file not found, permission denied, etc.).
    #[error("IO error: {0}")]
    Io(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A build run completed without succeeding.
    #[error("{0}")]
    BuildFailed(String),
}

impl CliError {
    /// Map error to appropriate exit code.
    ///
    /// Exit codes follow Unix conventions:
    /// - 0: Success
    /// - 1: General error
    /// - 2: Misuse of shell command (invalid arguments)
    /// - 64-78: Reserved for specific error categories (see sysexits.h)
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Arguments(_) => 2,
            Self::InvalidInput(_) => 65, // EX_DATAERR
            Self::Io(_) => 74,           // EX_IOERR
            Self::Config(_) => 78,       // EX_CONFIG
            Self::BuildFailed(_) => 1,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

const fn context_exit_code(err: &ContextError) -> u8 {
    match err {
        ContextError::Cancelled => 130,
        ContextError::DeadlineExceeded => 75, // EX_TEMPFAIL
    }
}

const fn client_exit_code(err: &ClientError) -> u8 {
    match err {
        ClientError::Network(_) => 69, // EX_UNAVAILABLE
        ClientError::InvalidUrl(_) => 2,
        ClientError::Context(reason) => context_exit_code(reason),
        ClientError::ApiRequestFailed { .. }
        | ClientError::InvalidResponse { .. }
        | ClientError::JsonParse(_)
        | ClientError::Pagination(_) => 1,
    }
}

const fn transfer_exit_code(err: &TransferError) -> u8 {
    match err {
        TransferError::Io { .. } => 74,
        TransferError::ShortRead { .. } | TransferError::InvalidOperation(_) => 65,
        TransferError::Network(_) => 69,
        TransferError::Context(reason) => context_exit_code(reason),
        TransferError::SymlinkRefused(_)
        | TransferError::IsDirectory(_)
        | TransferError::AlreadyExists(_) => 73, // EX_CANTCREAT
        TransferError::TaskFailed(_) => 71,      // EX_OSERR
        TransferError::UploadRejected { .. } | TransferError::DownloadFailed { .. } => 1,
    }
}

/// Exit code for a failed command.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    err.chain()
        .find_map(|cause| {
            if let Some(e) = cause.downcast_ref::<CliError>() {
                Some(e.exit_code())
            } else if let Some(e) = cause.downcast_ref::<ClientError>() {
                Some(client_exit_code(e))
            } else if let Some(e) = cause.downcast_ref::<TransferError>() {
                Some(transfer_exit_code(e))
            } else {
                cause.downcast_ref::<ContextError>().map(context_exit_code)
            }
        })
        .unwrap_or(1)
}
