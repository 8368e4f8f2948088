//! Chunk transport abstraction.
//!
//! Upload operations point at pre-signed URLs that carry their own
//! authorisation, so the transport sends no credentials of its own.

use std::time::Duration;

use asc_core::UploadOperation;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, Url};
use tracing::debug;

use crate::error::{TransferError, TransferResult};

// ============================================================================
// Chunk Transport Trait
// ============================================================================

/// Sends one chunk of a file to the destination an operation names.
#[async_trait]
pub trait ChunkTransport: Send + Sync {
    /// Send `body` using the operation's method, URL and headers.
    async fn send_chunk(&self, operation: &UploadOperation, body: Bytes) -> TransferResult<()>;
}

// ============================================================================
// Reqwest Transport
// ============================================================================

/// Production chunk transport using reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestChunkTransport {
    client: reqwest::Client,
}

impl ReqwestChunkTransport {
    /// Create a transport whose requests time out after `timeout`.
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
}

#[async_trait]
impl ChunkTransport for ReqwestChunkTransport {
    async fn send_chunk(&self, operation: &UploadOperation, body: Bytes) -> TransferResult<()> {
        let method = parse_method(&operation.method)?;
        let url = Url::parse(&operation.url)
            .map_err(|e| TransferError::InvalidOperation(format!("bad url: {e}")))?;
        let headers = header_map(operation)?;

        let response = self
            .client
            .request(method, url.clone())
            .headers(headers)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        debug!(
            url = %redact_url(&operation.url),
            offset = operation.offset,
            length = operation.length,
            status = status.as_u16(),
            "Chunk response"
        );

        if status.is_success() {
            Ok(())
        } else {
            Err(TransferError::UploadRejected {
                status: status.as_u16(),
                url: redact_url(url.as_str()),
            })
        }
    }
}

fn parse_method(method: &str) -> TransferResult<Method> {
    Method::from_bytes(method.trim().to_ascii_uppercase().as_bytes())
        .map_err(|_| TransferError::InvalidOperation(format!("bad method: {method:?}")))
}

fn header_map(operation: &UploadOperation) -> TransferResult<HeaderMap> {
    let mut headers = HeaderMap::with_capacity(operation.headers.len());
    for (name, value) in &operation.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| TransferError::InvalidOperation(format!("bad header name: {name:?}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| TransferError::InvalidOperation(format!("bad value for header {name}")))?;
        headers.insert(name, value);
    }
    Ok(headers)
}

/// Drop query and fragment so pre-signed credentials never reach logs or errors.
pub(crate) fn redact_url(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(mut url) => {
            url.set_query(None);
            url.set_fragment(None);
            url.to_string()
        }
        Err(_) => "<invalid url>".to_string(),
    }
}

// ============================================================================
// Recording Transport for Testing
// ============================================================================


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_method() {
        assert_eq!(parse_method("PUT").unwrap(), Method::PUT);
        assert_eq!(parse_method("post").unwrap(), Method::POST);
        assert!(matches!(
            parse_method("BAD METHOD"),
            Err(TransferError::InvalidOperation(_))
        ));
    }

    #[test]
    fn test_header_map_copies_headers() {
        let op = UploadOperation::new("PUT", "https://upload.example/a", 0, 1)
            .with_header("Content-Type", "application/octet-stream")
            .with_header("x-amz-acl", "private");

        let headers = header_map(&op).unwrap();
        assert_eq!(headers.len(), 2);
        assert_eq!(headers["content-type"], "application/octet-stream");
        assert_eq!(headers["x-amz-acl"], "private");
    }

    #[test]
    fn test_header_map_rejects_invalid_name() {
        let op = UploadOperation::new("PUT", "https://upload.example/a", 0, 1).with_header("bad name", "v");
        assert!(matches!(
            header_map(&op),
            Err(TransferError::InvalidOperation(_))
        ));
    }

    #[test]
    fn test_redact_url_strips_signature() {
        assert_eq!(
            redact_url("https://upload.example/chunk/1?X-Amz-Signature=secret#frag"),
            "https://upload.example/chunk/1"
        );
        assert_eq!(redact_url("::"), "<invalid url>");
    }

    #[tokio::test]
    async fn test_invalid_url_is_rejected_before_sending() {
        let transport = ReqwestChunkTransport::new(Duration::from_secs(5)).unwrap();
        let op = UploadOperation::new("PUT", "not a url", 0, 1);

        let result = transport.send_chunk(&op, Bytes::from_static(b"x")).await;
        assert!(matches!(result, Err(TransferError::InvalidOperation(_))));
    }
}
