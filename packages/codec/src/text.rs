//! Markup helpers shared by rendering and metrics

use regex::Regex;
use std::sync::OnceLock;

fn tag_pattern() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"))
}

pub(crate) fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Remove inline markup tags, keeping their text content
pub(crate) fn strip_tags(markup: &str) -> String {
    tag_pattern().replace_all(markup, "").into_owned()
}

/// Decode the handful of entities rich-text editors emit
pub(crate) fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    text.replace("&nbsp;", " ")
        .replace("&#160;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&amp;", "&")
}

/// Visible text of a rich-text string
pub(crate) fn visible_text(markup: &str) -> String {
    decode_entities(&strip_tags(markup))
}

/// Visible text of block-level markup, where tags separate words
pub(crate) fn markup_text(markup: &str) -> String {
    let spaced = tag_pattern().replace_all(markup, " ");
    decode_entities(&spaced)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
