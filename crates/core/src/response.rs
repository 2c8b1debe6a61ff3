//! Analyze responses.
//!
//! The response body is kept as an opaque JSON value; the accessors below
//! read the commonly used parts without imposing a schema.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Parsed body of a successful analyze call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalysisResponse(Value);

impl AnalysisResponse {
    /// Wraps a parsed response body.
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// The raw response body.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Consumes the wrapper, returning the raw response body.
    pub fn into_inner(self) -> Value {
        self.0
    }

    /// Summary score value for `attribute`, e.g. `TOXICITY`.
    pub fn summary_score(&self, attribute: &str) -> Option<f64> {
        self.0
            .get("attributeScores")?
            .get(attribute)?
            .get("summaryScore")?
            .get("value")?
            .as_f64()
    }

    /// Attributes present in `attributeScores`.
    pub fn attribute_names(&self) -> Vec<&str> {
        self.0
            .get("attributeScores")
            .and_then(Value::as_object)
            .map(|scores| scores.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Summary score of every attribute that has one.
    pub fn summary_scores(&self) -> Vec<(&str, f64)> {
        self.attribute_names()
            .into_iter()
            .filter_map(|name| self.summary_score(name).map(|score| (name, score)))
            .collect()
    }

    /// Languages the service detected or was told to use.
    pub fn languages(&self) -> Vec<&str> {
        self.0
            .get("languages")
            .and_then(Value::as_array)
            .map(|langs| langs.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Client token echoed back from the request.
    pub fn client_token(&self) -> Option<&str> {
        self.0.get("clientToken").and_then(Value::as_str)
    }
}

impl From<AnalysisResponse> for Value {
    fn from(response: AnalysisResponse) -> Self {
        response.0
    }
}
