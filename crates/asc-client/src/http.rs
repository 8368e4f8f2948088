//! HTTP backend abstraction.
//!
//! A trait-based transport allows dependency injection and easy testing. The
//! production implementation uses reqwest; it performs exactly one request
//! per call and leaves retrying to the [retry executor](crate::retry).

use asc_core::RequestContext;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::config::ApiClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::models::ApiErrorDocument;

// ============================================================================
// HTTP Backend Trait
// ============================================================================

/// Trait for HTTP backends that can fetch JSON from URLs.
#[async_trait]
pub trait HttpBackend: Send + Sync {
    /// Issue one authenticated GET and decode the JSON body.
    ///
    /// Non-2xx responses become [`ClientError::ApiRequestFailed`] carrying the
    /// decoded JSON:API errors. The request is abandoned if `ctx` finishes first.
    async fn get_json<T: DeserializeOwned + Send>(
        &self,
        ctx: &RequestContext,
        url: &Url,
    ) -> ClientResult<T>;
}

// ============================================================================
// Reqwest Backend
// ============================================================================

/// Production HTTP backend using reqwest.
pub struct ReqwestBackend {
    client: reqwest::Client,
    auth_token: Option<String>,
}

impl ReqwestBackend {
    /// Create a new reqwest backend with the given configuration.
    pub fn new(config: &ApiClientConfig) -> ClientResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            auth_token: config.token.clone(),
        })
    }

    /// Build a request with optional authentication.
    fn build_request(&self, url: &Url) -> reqwest::RequestBuilder {
        let request = self.client.get(url.as_str());
        match self.auth_token {
            Some(ref token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn fetch<T: DeserializeOwned>(&self, url: &Url) -> ClientResult<T> {
        let response = self.build_request(url).send().await?;
        let status = response.status();
        debug!(%url, status = status.as_u16(), "API response");

        let body = response.bytes().await?;
        if status.is_success() {
            return decode_success(url, &body);
        }

        let errors = serde_json::from_slice::<ApiErrorDocument>(&body)
            .map(|doc| doc.errors)
            .unwrap_or_default();

        Err(ClientError::ApiRequestFailed {
            status: status.as_u16(),
            url: url.to_string(),
            errors,
        })
    }
}

/// Decode a 2xx body, which must be a JSON:API document.
fn decode_success<T: DeserializeOwned>(url: &Url, body: &[u8]) -> ClientResult<T> {
    let document: serde_json::Value = serde_json::from_slice(body)?;
    if document.get("data").is_none() {
        return Err(ClientError::InvalidResponse {
            message: format!("response from {url} has no top-level `data` member"),
        });
    }
    Ok(serde_json::from_value(document)?)
}

#[async_trait]
impl HttpBackend for ReqwestBackend {
    async fn get_json<T: DeserializeOwned + Send>(
        &self,
        ctx: &RequestContext,
        url: &Url,
    ) -> ClientResult<T> {
        ctx.run(self.fetch(url)).await?
    }
}

// ============================================================================
// Fake Backend for Testing
// ============================================================================
