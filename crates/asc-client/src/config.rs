//! Public configuration for the API client.
//!
//! Configuration is resolved once at the command boundary and handed to the
//! client by value; nothing in this crate reads the environment.

use std::time::Duration;

/// Default service root.
pub const DEFAULT_BASE_URL: &str = "https://api.appstoreconnect.apple.com/";

/// Configuration for the API client.
///
/// Every field has a working default except the bearer token, which the
/// binary fills in from `ASC_BEARER_TOKEN`.
///
/// # Example
///
/// ```
/// use asc_client::ApiClientConfig;
/// use std::time::Duration;
///
/// let config = ApiClientConfig::new()
///     .with_token("eyJhbGciOiJFUzI1NiJ9...")
///     .with_timeout(Duration::from_secs(60));
/// ```
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Service root every relative resource path is resolved against
    pub(crate) base_url: String,
    /// Sent as `User-Agent`
    pub(crate) user_agent: String,
    /// Per-request timeout
    pub(crate) timeout: Duration,
    /// Bearer token sent with every request
    pub(crate) token: Option<String>,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: concat!("asc/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(30),
            token: None,
        }
    }
}

impl ApiClientConfig {
    /// Create a new configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the service root.
    ///
    /// Defaults to `https://api.appstoreconnect.apple.com/`.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the user agent string for HTTP requests.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the per-request timeout.
    ///
    /// Defaults to 30 seconds.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the bearer token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set an optional bearer token.
    #[must_use]
    pub fn with_optional_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    /// The configured service root.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The configured per-request timeout.
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}
