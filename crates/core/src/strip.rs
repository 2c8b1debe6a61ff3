//! HTML markup removal for comment text.
//!
//! Tags, comments, and doctype declarations are removed while text content
//! (including the content of `<script>` and `<style>` elements) is kept as
//! written. Character references such as `&amp;` are not decoded.
//!
//! The rewriter reads `<textarea>` and `<title>` bodies, and everything after
//! `<plaintext>`, as text, so tags written inside them are removed by a
//! second pattern-based pass over its output.

use std::sync::LazyLock;

use regex::Regex;

static COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid regex"));
static DOCTYPE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<!doctype[^>]*>").expect("valid regex"));
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"</?[a-zA-Z][^>]*>").expect("valid regex"));

/// Removes HTML markup from `text`.
///
/// Total for any input: when the streaming rewriter rejects the input, a
/// pattern-based stripper is used instead.
///
/// ```rust
/// use perspective_core::strip_html;
///
/// assert_eq!(strip_html("<p>good <b>test</b></p>"), "good test");
/// assert_eq!(strip_html("1 < 2"), "1 < 2");
/// ```
pub fn strip_html(text: &str) -> String {
    if !text.contains('<') {
        return text.to_string();
    }

    let without_comments = COMMENT.replace_all(text, "");
    let cleaned = DOCTYPE.replace_all(&without_comments, "");

    match rewrite_without_tags(&cleaned) {
        Some(stripped) if stripped.contains('<') => TAG.replace_all(&stripped, "").into_owned(),
        Some(stripped) => stripped,
        None => {
            tracing::warn!("HTML rewriter rejected comment text; falling back to pattern stripping");
            TAG.replace_all(&cleaned, "").to_string()
        }
    }
}

fn rewrite_without_tags(html: &str) -> Option<String> {
    let mut output = String::with_capacity(html.len());
    let mut rewriter = lol_html::HtmlRewriter::new(
        lol_html::Settings {
            element_content_handlers: vec![lol_html::element!("*", |el| {
                el.remove_and_keep_content();
                Ok(())
            })],
            ..Default::default()
        },
        |c: &[u8]| {
            output.push_str(&String::from_utf8_lossy(c));
        },
    );

    rewriter.write(html.as_bytes()).ok()?;
    rewriter.end().ok()?;

    Some(output)
}
