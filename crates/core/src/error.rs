//! Error types for Perspective operations.
//!
//! This module defines the main error type [`PerspectiveError`], which covers
//! local payload validation, client configuration, and failures reported by
//! the remote analysis service or the HTTP transport.
//!
//! Validation errors are produced before any network activity, so callers can
//! tell "fix the input" apart from "the remote call failed":
//!
//! ```rust
//! use perspective_core::{AnalyzeOptions, PerspectiveError, build_request};
//!
//! match build_request("", &AnalyzeOptions::default()) {
//!     Err(PerspectiveError::TextEmpty) => println!("nothing to analyze"),
//!     Err(e) => println!("Error: {}", e),
//!     Ok(request) => println!("{:?}", request),
//! }
//! ```

use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// Main error type for building and sending analysis requests.
#[derive(Error, Debug)]
pub enum PerspectiveError {
    /// The comment text is missing, or empty after HTML stripping.
    #[error("Comment text is empty")]
    TextEmpty,

    /// The comment text exceeds the maximum length and truncation was not requested.
    #[error("Comment text is too long ({length} characters, maximum is {max})")]
    TextTooLong { length: usize, max: usize },

    /// The service answered with a non-success status, or the request never got a response.
    #[error("Analyze request failed: {0}")]
    Response(#[from] ResponseError),

    /// Client configuration is unusable.
    ///
    /// Returned at construction time, e.g. when no API key was supplied.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Input could not be interpreted as comment text or as a request object.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The request payload could not be encoded as JSON.
    #[error("Failed to serialize request: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PerspectiveError {
    /// Returns true for errors raised by local validation, which retrying will not fix.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            PerspectiveError::TextEmpty | PerspectiveError::TextTooLong { .. } | PerspectiveError::InvalidInput(_)
        )
    }

    /// Returns true for failures reported by the service or the transport.
    pub fn is_remote(&self) -> bool {
        matches!(self, PerspectiveError::Response(_))
    }
}

/// Failure of the remote analyze call.
///
/// Carries the HTTP status and the raw response body when a response was
/// received. Both are absent for connection failures and timeouts.
#[derive(Debug, Clone)]
pub struct ResponseError {
    status: Option<u16>,
    message: String,
    body: Option<Value>,
    raw_body: Option<String>,
}

impl ResponseError {
    /// Builds an error from a received HTTP response.
    ///
    /// The message is taken from `error.message` of a JSON body, falling back
    /// to the canonical reason phrase of the status code.
    pub fn from_response(status: u16, raw_body: String) -> Self {
        let body = serde_json::from_str::<Value>(&raw_body).ok();
        let message = body
            .as_ref()
            .and_then(|b| b.pointer("/error/message"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| {
                reqwest::StatusCode::from_u16(status)
                    .ok()
                    .and_then(|s| s.canonical_reason())
                    .unwrap_or("Unknown status")
                    .to_string()
            });

        Self { status: Some(status), message, body, raw_body: Some(raw_body) }
    }

    /// Builds an error for a request that produced no response.
    pub fn transport(message: impl Into<String>) -> Self {
        Self { status: None, message: message.into(), body: None, raw_body: None }
    }

    /// Builds an error for a success response whose body is not valid JSON.
    pub fn invalid_body(status: u16, raw_body: String, reason: impl fmt::Display) -> Self {
        Self {
            status: Some(status),
            message: format!("Response body is not valid JSON: {}", reason),
            body: None,
            raw_body: Some(raw_body),
        }
    }

    /// Attaches the status of a response whose body could not be read.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// HTTP status code, if a response was received.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// Error message reported by the service or the transport.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Response body parsed as JSON, if it was valid JSON.
    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Response body as received.
    pub fn raw_body(&self) -> Option<&str> {
        self.raw_body.as_deref()
    }
}

impl fmt::Display for ResponseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "HTTP {}: {}", status, self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for ResponseError {}

impl From<reqwest::Error> for ResponseError {
    /// The request URL is dropped from the message: it carries the API key.
    fn from(err: reqwest::Error) -> Self {
        let err = err.without_url();
        if err.is_timeout() {
            ResponseError::transport(format!("request timed out: {}", err))
        } else {
            ResponseError::transport(err.to_string())
        }
    }
}

impl From<reqwest::Error> for PerspectiveError {
    fn from(err: reqwest::Error) -> Self {
        PerspectiveError::Response(err.into())
    }
}

/// Result type alias for PerspectiveError.
pub type Result<T> = std::result::Result<T, PerspectiveError>;
