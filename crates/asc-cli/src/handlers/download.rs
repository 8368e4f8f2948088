//! Download command handler.

use std::path::Path;

use anyhow::Result;
use serde_json::json;

use super::print_json;
use crate::bootstrap::CliContext;

/// Execute the download command.
///
/// The destination is replaced atomically; an existing file or symlink is
/// only replaced with `overwrite`.
pub async fn execute(ctx: &CliContext, url: &str, dest: &Path, overwrite: bool) -> Result<()> {
    let bytes = ctx
        .downloader
        .download(ctx.root(), url, dest, overwrite)
        .await?;

    print_json(&json!({
        "path": dest.display().to_string(),
        "bytes": bytes,
    }))
}
