//! Checksum command handler.

use std::path::Path;

use anyhow::Result;
use asc_core::ChecksumAlgorithm;

use super::print_json;

/// Execute the checksum command.
pub async fn execute(file: &Path, algorithm: ChecksumAlgorithm) -> Result<()> {
    let result = asc_transfer::checksum(file, algorithm).await?;
    print_json(&serde_json::to_value(&result)?)
}
