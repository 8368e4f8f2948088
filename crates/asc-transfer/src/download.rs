//! Streaming downloads into safely written files.

use std::path::Path;
use std::time::Duration;

use asc_core::RequestContext;
use futures_util::TryStreamExt;
use tracing::info;

use crate::error::{TransferError, TransferResult};
use crate::fs::{check_destination, write_stream_atomically};
use crate::transport::redact_url;

/// Downloads URLs to local files without ever writing a partial destination.
#[derive(Debug, Clone)]
pub struct Downloader {
    client: reqwest::Client,
}

impl Downloader {
    /// Create a downloader whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> TransferResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("asc/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    /// Wrap an existing client.
    pub const fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// GET `url` and write the body to `path`, returning the byte count.
    ///
    /// The destination is checked before any request is made; see
    /// [`write_stream_atomically`] for the overwrite rules.
    pub async fn download(
        &self,
        ctx: &RequestContext,
        url: &str,
        path: &Path,
        overwrite: bool,
    ) -> TransferResult<u64> {
        check_destination(path, overwrite).await?;

        let response = ctx.run(self.client.get(url).send()).await??;
        let status = response.status();
        if !status.is_success() {
            return Err(TransferError::DownloadFailed {
                status: status.as_u16(),
                url: redact_url(url),
            });
        }

        let body = response.bytes_stream().map_err(TransferError::from);
        let bytes = write_stream_atomically(ctx, path, overwrite, body).await?;

        info!(url = %redact_url(url), path = %path.display(), bytes, "Downloaded file");
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_destination_checked_before_request() {
        let dir = TempDir::new().unwrap();
        let downloader = Downloader::new(Duration::from_secs(5)).unwrap();

        // Nothing listens on port 1, so reaching the network would fail differently.
        let err = downloader
            .download(&RequestContext::new(), "http://127.0.0.1:1/file", dir.path(), true)
            .await
            .unwrap_err();

        assert!(matches!(err, TransferError::IsDirectory(_)));
    }

    #[tokio::test]
    async fn test_connection_failure_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("file.bin");
        let downloader = Downloader::new(Duration::from_secs(5)).unwrap();

        let err = downloader
            .download(&RequestContext::new(), "http://127.0.0.1:1/file", &dest, false)
            .await
            .unwrap_err();

        assert!(matches!(err, TransferError::Network(_)));
        assert!(!dest.exists());
    }
}
