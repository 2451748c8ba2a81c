//! Browser tests, run with `wasm-pack test --headless --firefox`

#![cfg(target_arch = "wasm32")]

use scribe_wasm::{compute_metrics_js, normalize_content_js, render_html_js, validate_for_publish_js};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

const ARTICLE: &str = r#"{"blocks":[
    {"type":"heading","data":{"level":2,"text":"Notes"}},
    {"type":"paragraph","data":{"text":"Short <b>and</b> sweet."}}
]}"#;

#[wasm_bindgen_test]
fn renders_article() {
    let result = render_html_js(ARTICLE, false, false).unwrap();
    assert_eq!(result.html(), "<h2>Notes</h2><p>Short <b>and</b> sweet.</p>");
}

#[wasm_bindgen_test]
fn computes_metrics_json() {
    let json = compute_metrics_js(ARTICLE, None).unwrap();
    assert_eq!(
        json,
        r#"{"wordCount":4,"readingTime":1,"excerpt":"Notes Short and sweet."}"#
    );
}

#[wasm_bindgen_test]
fn rejects_unparseable_content() {
    assert!(render_html_js("{\"blocks\":7}", false, false).is_err());
    assert!(!validate_for_publish_js("").unwrap());
}

#[wasm_bindgen_test]
fn normalizes_legacy_html() {
    assert_eq!(
        normalize_content_js("<p>old</p>").unwrap(),
        r#"{"blocks":[{"type":"raw","data":{"html":"<p>old</p>"}}]}"#
    );
}
