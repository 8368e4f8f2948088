//! Get command handler.
//!
//! Fetches a single document, or with `--paginate` walks the whole
//! collection and prints it as one page.

use anyhow::Result;
use asc_client::{ClientError, PaginationOptions, execute as with_retry};
use serde_json::Value;
use tracing::debug;

use super::print_json;
use crate::bootstrap::CliContext;

/// Execute the get command.
///
/// Every request goes through the configured retry policy. A `limit`
/// without `--paginate` fetches one page of that size.
pub async fn execute(ctx: &CliContext, path: &str, paginate: bool, limit: Option<u32>) -> Result<()> {
    let client = ctx.client();
    let root = ctx.root();
    let policy = &ctx.retry;

    let document: Value = if paginate {
        let all = client
            .list_all::<Value>(root, path, limit, policy, &PaginationOptions::default())
            .await?;
        debug!(items = all.data.len(), "Collected every page");
        serde_json::to_value(all)?
    } else if limit.is_some() {
        let page = with_retry(root, policy, move || async move {
            client
                .list_page::<Value>(root, path, limit)
                .await
                .map_err(ClientError::into_retry)
        })
        .await?;
        serde_json::to_value(page)?
    } else {
        with_retry(root, policy, move || async move {
            client
                .get_document::<Value>(root, path)
                .await
                .map_err(ClientError::into_retry)
        })
        .await?
    };

    print_json(&document)
}
