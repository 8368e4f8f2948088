//! CLI bootstrap - the composition root.
//!
//! This module is the ONLY place where the runtime is wired together for the
//! CLI: the API client, the retry policy, the upload executor and the
//! downloader are all built here from a resolved [`CliConfig`].

use asc_client::{DefaultApiClient, RetryPolicy};
use asc_core::RequestContext;
use asc_transfer::{Downloader, ReqwestChunkTransport, UploadExecutor};

use crate::config::CliConfig;
use crate::error::CliError;

/// Fully composed runtime for CLI commands.
pub struct CliContext {
    /// JSON:API client.
    pub client: DefaultApiClient,
    /// Retry policy applied to API reads.
    pub retry: RetryPolicy,
    /// Chunked upload executor.
    pub uploader: UploadExecutor<ReqwestChunkTransport>,
    /// Safe downloader.
    pub downloader: Downloader,
    /// Root context every command runs under; cancelled on Ctrl-C.
    pub root: RequestContext,
}

impl CliContext {
    /// Access the API client.
    pub const fn client(&self) -> &DefaultApiClient {
        &self.client
    }

    /// Access the root request context.
    pub const fn root(&self) -> &RequestContext {
        &self.root
    }
}

/// Build the runtime from resolved configuration.
///
/// Fails with a configuration error if the base URL does not parse or an
/// HTTP client cannot be constructed.
pub fn bootstrap(config: CliConfig) -> Result<CliContext, CliError> {
    let client = DefaultApiClient::new(&config.api)
        .map_err(|e| CliError::Config(format!("API client: {e}")))?;
    let transport = ReqwestChunkTransport::new(config.transfer_timeout)
        .map_err(|e| CliError::Config(format!("upload transport: {e}")))?;
    let downloader = Downloader::new(config.transfer_timeout)
        .map_err(|e| CliError::Config(format!("downloader: {e}")))?;

    Ok(CliContext {
        client,
        retry: config.retry,
        uploader: UploadExecutor::new(transport, config.upload),
        downloader,
        root: RequestContext::new(),
    })
}
