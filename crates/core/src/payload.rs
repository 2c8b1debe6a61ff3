//! Payload construction and validation.
//!
//! [`build_request`] turns raw text or a partially specified request into a
//! request ready to send. Rules are applied in a fixed order on an owned copy:
//!
//! 1. wrap raw text as `{comment: {text}}`
//! 2. strip HTML from `comment.text` (when `strip_html`)
//! 3. reject empty text, reject or truncate text over [`MAX_TEXT_LENGTH`]
//! 4. resolve `requestedAttributes`
//! 5. fill in `doNotStore` when the request does not set it
//!
//! No network access happens here, so every error from this module means the
//! input has to change.

use crate::request::{AnalysisInput, AnalysisRequest, AnalyzeOptions, AttributeOptions, Comment, DEFAULT_ATTRIBUTE};
use crate::strip::strip_html;
use crate::{PerspectiveError, Result};

/// Maximum comment length, in characters, accepted by the service.
pub const MAX_TEXT_LENGTH: usize = 3000;

/// Builds a validated analyze request.
///
/// # Example
///
/// ```rust
/// use perspective_core::{AnalyzeOptions, build_request};
///
/// let request = build_request("<p>good test</p>", &AnalyzeOptions::default()).unwrap();
/// assert_eq!(request.text(), Some("good test"));
/// assert_eq!(request.do_not_store, Some(true));
/// assert_eq!(request.attribute_names(), vec!["TOXICITY"]);
/// ```
pub fn build_request(input: impl Into<AnalysisInput>, options: &AnalyzeOptions) -> Result<AnalysisRequest> {
    let mut request = match input.into() {
        AnalysisInput::Text(text) => AnalysisRequest { comment: Some(Comment::new(text)), ..Default::default() },
        AnalysisInput::Request(request) => request,
    };

    if options.strip_html
        && let Some(text) = request.comment.as_mut().and_then(|c| c.text.as_mut())
    {
        *text = strip_html(text);
    }

    validate_text(&mut request, options.truncate)?;
    resolve_attributes(&mut request, options);

    if request.do_not_store.is_none() {
        request.do_not_store = Some(options.do_not_store);
    }

    Ok(request)
}

/// Builds a request from borrowed input, leaving the input untouched.
pub fn build_request_ref(input: &AnalysisInput, options: &AnalyzeOptions) -> Result<AnalysisRequest> {
    build_request(input.clone(), options)
}

fn validate_text(request: &mut AnalysisRequest, truncate: bool) -> Result<()> {
    let text = match request.comment.as_mut().and_then(|c| c.text.as_mut()) {
        Some(text) if !text.is_empty() => text,
        _ => return Err(PerspectiveError::TextEmpty),
    };

    let length = text.chars().count();
    if length <= MAX_TEXT_LENGTH {
        return Ok(());
    }

    if !truncate {
        return Err(PerspectiveError::TextTooLong { length, max: MAX_TEXT_LENGTH });
    }

    let cut = text.char_indices().nth(MAX_TEXT_LENGTH).map(|(idx, _)| idx);
    if let Some(cut) = cut {
        text.truncate(cut);
    }
    tracing::debug!(length, max = MAX_TEXT_LENGTH, "truncated comment text");

    Ok(())
}

fn resolve_attributes(request: &mut AnalysisRequest, options: &AnalyzeOptions) {
    match &options.attributes {
        Some(selection) => {
            request.requested_attributes = Some(selection.clone().into_requested());
        }
        None if request.requested_attributes.is_none() => {
            tracing::debug!(attribute = DEFAULT_ATTRIBUTE, "no attributes requested; using default");
            request.requested_attributes =
                Some([(DEFAULT_ATTRIBUTE.to_string(), AttributeOptions::default())].into_iter().collect());
        }
        None => {}
    }
}
