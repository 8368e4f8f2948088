//! Build run command handlers.

use std::time::Duration;

use anyhow::Result;
use tracing::info;

use super::print_json;
use crate::bootstrap::CliContext;
use crate::error::CliError;

/// Execute the wait-build-run command.
///
/// Polls every `interval` until the run completes or `timeout` elapses,
/// prints the final status, and fails unless the run succeeded.
pub async fn wait(ctx: &CliContext, id: &str, interval: Duration, timeout: Duration) -> Result<()> {
    let wait_ctx = ctx.root().child().within(timeout);

    let status = ctx
        .client()
        .wait_for_build_run(&wait_ctx, id, interval, &ctx.retry)
        .await?;
    info!(build_run = id, %status, "Build run finished");

    print_json(&serde_json::to_value(&status)?)?;

    if !status.is_successful() {
        return Err(CliError::BuildFailed(format!("build run {id} completed as {status}")).into());
    }
    Ok(())
}
