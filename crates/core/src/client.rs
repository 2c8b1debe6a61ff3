//! Analysis client.
//!
//! [`Perspective`] validates input locally with [`build_request`], sends the
//! request through a [`Transport`], and maps the HTTP outcome to an
//! [`AnalysisResponse`] or a [`ResponseError`].
//!
//! # Example
//!
//! ```rust,no_run
//! use perspective_core::{AnalyzeOptions, ClientConfig, Perspective};
//!
//! # #[tokio::main]
//! # async fn main() -> perspective_core::Result<()> {
//! let client = Perspective::new(ClientConfig::builder().api_key("my-key").build())?;
//! let options = AnalyzeOptions::builder().attributes(["toxicity", "spam"]).build();
//! let response = client.analyze("testing is for dummies", &options).await?;
//! println!("{:?}", response.summary_score("TOXICITY"));
//! # Ok(())
//! # }
//! ```

use std::fmt;

use url::Url;

use crate::error::ResponseError;
use crate::payload::build_request;
use crate::request::{AnalysisInput, AnalysisRequest, AnalyzeOptions};
use crate::response::AnalysisResponse;
use crate::transport::{HttpTransport, Transport, TransportResponse};
use crate::{ClientConfig, Result};

/// Client for the analyze endpoint.
///
/// Cheap to share by reference: concurrent [`Perspective::analyze`] calls hold
/// no shared mutable state apart from the transport's lazily built HTTP client.
pub struct Perspective<T = HttpTransport> {
    config: ClientConfig,
    api_key: String,
    endpoint: Url,
    transport: T,
}

impl Perspective<HttpTransport> {
    /// Creates a client using the default reqwest transport.
    ///
    /// Fails with [`crate::PerspectiveError::Configuration`] when no API key is
    /// configured. Nothing is sent over the network here.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config);
        Self::with_transport(config, transport)
    }

    /// Creates a client with the API key taken from `PERSPECTIVE_API_KEY`.
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env())
    }
}

impl<T: Transport> Perspective<T> {
    /// Creates a client that sends requests through `transport`.
    pub fn with_transport(config: ClientConfig, transport: T) -> Result<Self> {
        let api_key = config.require_api_key()?.to_string();
        let endpoint = config.endpoint_url()?;

        Ok(Self { config, api_key, endpoint, transport })
    }

    /// The configuration this client was created with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The transport requests are sent through.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Builds the request `analyze` would send, without sending it.
    pub fn make_request(&self, input: impl Into<AnalysisInput>, options: &AnalyzeOptions) -> Result<AnalysisRequest> {
        build_request(input, options)
    }

    /// Analyzes `input` and returns the service response.
    ///
    /// Validation errors are returned before any network activity. Non-2xx
    /// responses and transport failures become [`ResponseError`]s. Nothing is
    /// retried.
    #[tracing::instrument(skip_all, fields(endpoint = %self.endpoint))]
    pub async fn analyze(&self, input: impl Into<AnalysisInput>, options: &AnalyzeOptions) -> Result<AnalysisResponse> {
        let request = build_request(input, options)?;
        let body = serde_json::to_value(&request)?;

        tracing::debug!(attributes = ?request.attribute_names(), "sending analyze request");
        let response = self.transport.post_json(&self.endpoint, &self.api_key, &body).await?;
        tracing::debug!(status = response.status, "analyze response received");

        into_analysis_response(response)
    }

    /// Analyzes `text` with default options.
    pub async fn analyze_text(&self, text: &str) -> Result<AnalysisResponse> {
        self.analyze(text, &AnalyzeOptions::default()).await
    }
}

impl<T> fmt::Debug for Perspective<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Perspective")
            .field("endpoint", &self.endpoint.as_str())
            .field("timeout", &self.config.timeout)
            .finish_non_exhaustive()
    }
}

fn into_analysis_response(response: TransportResponse) -> Result<AnalysisResponse> {
    let success = response.is_success();
    let TransportResponse { status, body } = response;

    if !success {
        let err = ResponseError::from_response(status, body);
        tracing::warn!(status, message = err.message(), "analyze request rejected");
        return Err(err.into());
    }

    match serde_json::from_str(&body) {
        Ok(value) => Ok(AnalysisResponse::new(value)),
        Err(e) => Err(ResponseError::invalid_body(status, body, e).into()),
    }
}
