//! Command handlers.
//!
//! Handlers follow the canonical pattern:
//! - Signature: `pub async fn execute(ctx: &CliContext, ...) -> Result<()>`
//! - Thin wrappers that:
//!   1. Parse/validate CLI-specific input
//!   2. Call into the runtime through the context
//!   3. Print the result as JSON on stdout
//!
//! Diagnostics go through `tracing` to stderr; stdout carries only results.

pub mod builds;
pub mod checksum;
pub mod download;
pub mod get;
pub mod upload;

use anyhow::Result;
use serde_json::Value;

/// Print a JSON value on stdout.
pub(crate) fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
