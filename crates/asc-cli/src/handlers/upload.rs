//! Upload command handler.
//!
//! Takes the upload operations the service handed out when the upload was
//! reserved, checks that they partition the file, sends every chunk and
//! prints the MD5 checksum to commit the upload with.

use std::path::Path;

use anyhow::Result;
use asc_core::{ChecksumAlgorithm, UploadOperation, check_partition};
use serde_json::json;

use super::print_json;
use crate::bootstrap::CliContext;
use crate::error::CliError;

/// Execute the upload command.
///
/// `operations` is either a JSON array or the path of a file holding one.
pub async fn execute(ctx: &CliContext, file: &Path, operations: &str) -> Result<()> {
    let operations = load_operations(operations).await?;

    let size = tokio::fs::metadata(file)
        .await
        .map_err(|e| CliError::Io(format!("{}: {e}", file.display())))?
        .len();
    check_partition(&operations, size).map_err(|e| CliError::InvalidInput(e.to_string()))?;

    let report = ctx.uploader.upload(ctx.root(), file, &operations).await?;
    let checksum = asc_transfer::checksum(file, ChecksumAlgorithm::Md5).await?;

    print_json(&json!({
        "operations": report.operations,
        "bytes": report.bytes,
        "checksum": checksum,
    }))
}

/// Parse operations given inline or read them from a file.
pub async fn load_operations(arg: &str) -> Result<Vec<UploadOperation>, CliError> {
    let inline = arg.trim_start();
    let (source, raw) = if inline.starts_with('[') {
        ("--operations", inline.as_bytes().to_vec())
    } else {
        let raw = tokio::fs::read(arg)
            .await
            .map_err(|e| CliError::Io(format!("{arg}: {e}")))?;
        (arg, raw)
    };

    serde_json::from_slice(&raw).map_err(|e| CliError::InvalidInput(format!("{source}: {e}")))
}
