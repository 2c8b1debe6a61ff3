//! HTTP transport for analyze calls.
//!
//! [`Transport`] is the seam between the client and the network. The default
//! [`HttpTransport`] uses reqwest and creates its `reqwest::Client` lazily on
//! first use; later calls, including concurrent ones, share that handle.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tokio::sync::OnceCell;
use url::Url;

use crate::{ClientConfig, PerspectiveError, ResponseError, Result};

/// Status and raw body of an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body as received.
    pub body: String,
}

impl TransportResponse {
    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends a JSON body with the API key as a query parameter.
///
/// Implementations return `Ok` for any HTTP response, whatever its status,
/// and an error only when no response was received.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post_json(&self, url: &Url, api_key: &str, body: &Value) -> Result<TransportResponse>;
}

/// reqwest-backed transport.
#[derive(Debug)]
pub struct HttpTransport {
    timeout: Duration,
    user_agent: String,
    client: OnceCell<Client>,
}

impl HttpTransport {
    /// Creates a transport using the timeout and User-Agent from `config`.
    ///
    /// No connection is made and no client is built until the first request.
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.timeout),
            user_agent: config.user_agent.clone(),
            client: OnceCell::new(),
        }
    }

    /// Returns the shared reqwest client, building it on first use.
    pub async fn client(&self) -> Result<&Client> {
        self.client
            .get_or_try_init(|| async {
                tracing::debug!(timeout_secs = self.timeout.as_secs(), "building HTTP client");
                Client::builder()
                    .timeout(self.timeout)
                    .user_agent(self.user_agent.as_str())
                    .build()
                    .map_err(PerspectiveError::from)
            })
            .await
    }

    /// Returns true once the reqwest client has been built.
    pub fn is_initialized(&self) -> bool {
        self.client.initialized()
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new(&ClientConfig::default())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(&self, url: &Url, api_key: &str, body: &Value) -> Result<TransportResponse> {
        let client = self.client().await?;

        let response = client
            .post(url.clone())
            .query(&[("key", api_key)])
            .json(body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ResponseError::from(e).with_status(status))?;

        Ok(TransportResponse { status, body })
    }
}
