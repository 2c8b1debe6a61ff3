//! Client configuration.
//!
//! Controls credentials and HTTP settings for [`crate::Perspective`].

use url::Url;

use crate::{PerspectiveError, Result};

/// Analyze endpoint of the Perspective Comment Analyzer API.
pub const DEFAULT_ENDPOINT: &str = "https://commentanalyzer.googleapis.com/v1alpha1/comments:analyze";

/// Environment variable read by [`ClientConfig::from_env`].
pub const API_KEY_ENV: &str = "PERSPECTIVE_API_KEY";

/// Configuration for the analysis client.
///
/// # Example
///
/// ```rust
/// use perspective_core::ClientConfig;
///
/// let config = ClientConfig::builder()
///     .api_key("my-key")
///     .timeout(10)
///     .build();
/// assert_eq!(config.timeout, 10);
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API key sent as the `key` query parameter. Required.
    pub api_key: Option<String>,
    /// Analyze endpoint (default: [`DEFAULT_ENDPOINT`]).
    pub endpoint: String,
    /// Request timeout in seconds (default: 30).
    pub timeout: u64,
    /// User-Agent header for HTTP requests.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: 30,
            user_agent: format!("perspective-core/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Creates a new builder for ClientConfig.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Default configuration with the API key taken from `PERSPECTIVE_API_KEY`.
    pub fn from_env() -> Self {
        Self { api_key: std::env::var(API_KEY_ENV).ok(), ..Default::default() }
    }

    /// Returns the API key, failing when it is missing or blank.
    pub fn require_api_key(&self) -> Result<&str> {
        match self.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(PerspectiveError::Configuration(format!(
                "an API key is required (set it on the config or via {})",
                API_KEY_ENV
            ))),
        }
    }

    /// Parses the configured endpoint.
    pub fn endpoint_url(&self) -> Result<Url> {
        let url = Url::parse(&self.endpoint)
            .map_err(|e| PerspectiveError::Configuration(format!("invalid endpoint {:?}: {}", self.endpoint, e)))?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(PerspectiveError::Configuration(format!(
                "endpoint must use http or https, got {}",
                other
            ))),
        }
    }
}

/// Builder for ClientConfig.
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self { config: ClientConfig::default() }
    }

    /// Sets the API key.
    pub fn api_key(mut self, value: impl Into<String>) -> Self {
        self.config.api_key = Some(value.into());
        self
    }

    /// Sets the analyze endpoint.
    pub fn endpoint(mut self, value: impl Into<String>) -> Self {
        self.config.endpoint = value.into();
        self
    }

    /// Sets the request timeout in seconds.
    pub fn timeout(mut self, value: u64) -> Self {
        self.config.timeout = value;
        self
    }

    /// Sets the User-Agent header.
    pub fn user_agent(mut self, value: impl Into<String>) -> Self {
        self.config.user_agent = value.into();
        self
    }

    /// Builds the config.
    pub fn build(self) -> ClientConfig {
        self.config
    }
}

impl Default for ClientConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
