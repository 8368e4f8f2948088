//! API client for JSON:API resources.
//!
//! The client is a thin layer that composes the transport with the
//! pagination aggregator, the retry executor and the completion poller.

mod resources;

use url::Url;

use crate::config::ApiClientConfig;
use crate::error::ClientResult;
use crate::http::{HttpBackend, ReqwestBackend};

// ============================================================================
// Type Aliases
// ============================================================================

/// Default API client using the reqwest HTTP backend.
pub type DefaultApiClient = ApiClient<ReqwestBackend>;

// ============================================================================
// Client
// ============================================================================

/// Client for the service's JSON:API endpoints.
///
/// Generic over an HTTP backend so tests can substitute canned responses.
/// Use [`DefaultApiClient`] in production code.
pub struct ApiClient<B: HttpBackend> {
    pub(crate) backend: B,
    pub(crate) base_url: Url,
}

impl DefaultApiClient {
    /// Create a new client with the given configuration.
    pub fn new(config: &ApiClientConfig) -> ClientResult<Self> {
        let backend = ReqwestBackend::new(config)?;
        Self::with_backend(config, backend)
    }
}

impl<B: HttpBackend> ApiClient<B> {
    /// Create a client over a custom backend.
    pub fn with_backend(config: &ApiClientConfig, backend: B) -> ClientResult<Self> {
        let base_url = Url::parse(config.base_url())?;
        Ok(Self { backend, base_url })
    }

    /// The service root relative paths are resolved against.
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The transport this client issues requests through.
    pub const fn backend(&self) -> &B {
        &self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use crate::http::testing::FakeBackend;

    #[test]
    fn test_default_client_creation() {
        let client = DefaultApiClient::new(&ApiClientConfig::new()).unwrap();
        assert_eq!(
            client.base_url().as_str(),
            "https://api.appstoreconnect.apple.com/"
        );
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let config = ApiClientConfig::new().with_base_url("not a url");
        let result = ApiClient::with_backend(&config, FakeBackend::new());
        assert!(matches!(result, Err(ClientError::InvalidUrl(_))));
    }
}
