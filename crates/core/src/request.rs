//! Wire data model for the analyze operation.
//!
//! [`AnalysisRequest`] mirrors the JSON body of `comments:analyze`. Fields
//! this crate does not know about are kept in flattened passthrough maps so a
//! caller-built request survives a round trip through the builder unchanged.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{PerspectiveError, Result};

/// Attribute requested when the caller names none.
pub const DEFAULT_ATTRIBUTE: &str = "TOXICITY";

/// The comment being analyzed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    /// Comment text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Text type, e.g. `PLAIN_TEXT`.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub text_type: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Comment {
    /// Creates a comment holding `text`.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: Some(text.into()), ..Default::default() }
    }
}

/// Per-attribute scoring configuration.
///
/// An empty value serializes to `{}`, which asks for the service defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeOptions {
    /// Score type, e.g. `PROBABILITY`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_type: Option<String>,

    /// Scores below this threshold are omitted from the response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_threshold: Option<f64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Mapping from attribute name to its scoring configuration.
pub type RequestedAttributes = BTreeMap<String, AttributeOptions>;

/// Body of an analyze call.
///
/// # Example
///
/// ```rust
/// use perspective_core::{AnalysisRequest, Comment};
///
/// let request = AnalysisRequest {
///     comment: Some(Comment::new("hooray")),
///     client_token: Some("t".to_string()),
///     ..Default::default()
/// };
/// let json = serde_json::to_value(&request).unwrap();
/// assert_eq!(json["comment"]["text"], "hooray");
/// assert_eq!(json["clientToken"], "t");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<Comment>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_attributes: Option<RequestedAttributes>,

    /// Asks the service not to store the comment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub do_not_store: Option<bool>,

    /// Opaque token echoed back in the response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_token: Option<String>,

    /// ISO 639-1 language codes; detected by the service when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub languages: Option<Vec<String>>,

    /// Request per-span scores in addition to the summary score.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span_annotations: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub community_id: Option<String>,

    /// Surrounding conversation, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AnalysisRequest {
    /// Comment text, if any.
    pub fn text(&self) -> Option<&str> {
        self.comment.as_ref().and_then(|c| c.text.as_deref())
    }

    /// Names of the requested attributes, in sorted order.
    pub fn attribute_names(&self) -> Vec<&str> {
        self.requested_attributes
            .as_ref()
            .map(|attrs| attrs.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

/// Input accepted by the payload builder: raw text or a pre-built request.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisInput {
    /// Raw comment text.
    Text(String),
    /// A request object shaped like the wire payload.
    Request(AnalysisRequest),
}

impl AnalysisInput {
    /// Interprets a JSON value as builder input.
    ///
    /// Strings become text, objects become requests, and `null` becomes empty
    /// text (which the builder rejects as empty).
    pub fn from_json(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(AnalysisInput::Text(String::new())),
            Value::String(text) => Ok(AnalysisInput::Text(text)),
            Value::Object(_) => serde_json::from_value(value)
                .map(AnalysisInput::Request)
                .map_err(|e| PerspectiveError::InvalidInput(format!("malformed request object: {}", e))),
            other => Err(PerspectiveError::InvalidInput(format!(
                "expected comment text or a request object, got {}",
                json_type_name(&other)
            ))),
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl From<&str> for AnalysisInput {
    fn from(text: &str) -> Self {
        AnalysisInput::Text(text.to_string())
    }
}

impl From<String> for AnalysisInput {
    fn from(text: String) -> Self {
        AnalysisInput::Text(text)
    }
}

impl From<Option<String>> for AnalysisInput {
    fn from(text: Option<String>) -> Self {
        AnalysisInput::Text(text.unwrap_or_default())
    }
}

impl From<AnalysisRequest> for AnalysisInput {
    fn from(request: AnalysisRequest) -> Self {
        AnalysisInput::Request(request)
    }
}

/// Attributes to request, as names or as a full mapping.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeSelection {
    /// Attribute names; uppercased and given default scoring options.
    Names(Vec<String>),
    /// Attribute mapping, used as given.
    Map(RequestedAttributes),
}

impl AttributeSelection {
    /// Resolves the selection into the wire mapping.
    pub fn into_requested(self) -> RequestedAttributes {
        match self {
            AttributeSelection::Names(names) => names
                .into_iter()
                .map(|name| (name.to_uppercase(), AttributeOptions::default()))
                .collect(),
            AttributeSelection::Map(map) => map,
        }
    }
}

impl<S: Into<String>> FromIterator<S> for AttributeSelection {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        AttributeSelection::Names(iter.into_iter().map(Into::into).collect())
    }
}

impl From<RequestedAttributes> for AttributeSelection {
    fn from(map: RequestedAttributes) -> Self {
        AttributeSelection::Map(map)
    }
}

/// Per-call options for building a request.
///
/// # Example
///
/// ```rust
/// use perspective_core::AnalyzeOptions;
///
/// let options = AnalyzeOptions::builder()
///     .truncate(true)
///     .attributes(["spam", "toxicity"])
///     .build();
/// assert!(options.strip_html);
/// ```
#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    /// Remove HTML markup before length checks (default: true).
    pub strip_html: bool,

    /// Cut overlong text instead of failing (default: false).
    pub truncate: bool,

    /// Value for `doNotStore` when the request does not set one (default: true).
    pub do_not_store: bool,

    /// Attributes to request; `None` keeps the request's own or falls back to TOXICITY.
    pub attributes: Option<AttributeSelection>,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self { strip_html: true, truncate: false, do_not_store: true, attributes: None }
    }
}

impl AnalyzeOptions {
    /// Creates a new builder for AnalyzeOptions.
    pub fn builder() -> AnalyzeOptionsBuilder {
        AnalyzeOptionsBuilder::new()
    }
}

/// Builder for AnalyzeOptions.
pub struct AnalyzeOptionsBuilder {
    options: AnalyzeOptions,
}

impl AnalyzeOptionsBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self { options: AnalyzeOptions::default() }
    }

    /// Sets whether HTML markup is stripped.
    pub fn strip_html(mut self, value: bool) -> Self {
        self.options.strip_html = value;
        self
    }

    /// Sets whether overlong text is truncated.
    pub fn truncate(mut self, value: bool) -> Self {
        self.options.truncate = value;
        self
    }

    /// Sets the default for `doNotStore`.
    pub fn do_not_store(mut self, value: bool) -> Self {
        self.options.do_not_store = value;
        self
    }

    /// Requests the given attribute names.
    pub fn attributes<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.attributes = Some(names.into_iter().collect());
        self
    }

    /// Requests attributes with explicit scoring options.
    pub fn attribute_map(mut self, map: RequestedAttributes) -> Self {
        self.options.attributes = Some(AttributeSelection::Map(map));
        self
    }

    /// Builds the options.
    pub fn build(self) -> AnalyzeOptions {
        self.options
    }
}

impl Default for AnalyzeOptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
