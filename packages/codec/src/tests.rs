use crate::{
    decode, encode, excerpt, infer_title, reading_time, render, render_html, validate_for_draft,
    validate_for_publish, word_count, CodecWarning, RenderOptions, ValidationError,
    DEFAULT_WORDS_PER_MINUTE,
};
use scribe_document::{Block, Document, ImageData, ListStyle};
use serde_json::json;

fn worked_example() -> Document {
    let form = json!({
        "blocks": [
            { "type": "heading", "data": { "level": 1, "text": "Hello" } },
            { "type": "paragraph", "data": { "text": "World" } }
        ]
    });
    decode(&form).expect("Failed to decode").document
}

#[test]
fn test_worked_example() {
    let doc = worked_example();

    assert_eq!(word_count(&doc), 2);
    assert_eq!(infer_title(&doc), "Hello");
    assert_eq!(excerpt(&doc, 5), "Hello…");
    assert_eq!(render_html(&doc), "<h1>Hello</h1><p>World</p>");
}

#[test]
fn test_round_trip_preserves_every_block() {
    let doc = Document::from_blocks(vec![
        Block::heading(2, "Intro"),
        Block::paragraph(""),
        Block::list(ListStyle::Ordered, vec!["a".into(), "<b>b</b>".into()]),
        Block::quote("q", Some("who".into())),
        Block::code("fn main() {}"),
        Block::delimiter(),
        Block::image("https://cdn.example/x.png"),
        Block::embed("https://video.example/embed/1"),
        Block::raw("<aside>side</aside>"),
    ]);

    let value = encode(&doc).to_value().unwrap();
    let decoded = decode(&value).unwrap();

    assert!(decoded.is_clean());
    assert_eq!(decoded.document.blocks(), doc.blocks());
}

#[test]
fn test_out_of_range_heading_renders_and_round_trips_clamped() {
    let doc = Document::from_blocks(vec![Block::heading(9, "x"), Block::heading(0, "y")]);
    assert_eq!(render_html(&doc), "<h6>x</h6><h1>y</h1>");

    let value = encode(&doc).to_value().unwrap();
    assert_eq!(value["blocks"][0]["data"]["level"], 6);
    assert_eq!(decode(&value).unwrap().document.blocks(), doc.blocks());
}

#[test]
fn test_render_omits_image_without_url() {
    let doc = Document::from_blocks(vec![Block::Image(ImageData::default())]);

    let rendered = render(&doc, &RenderOptions::default());

    assert!(!rendered.html.contains("<img"));
    assert!(!rendered.html.contains("<figure"));
    assert_eq!(
        rendered.warnings,
        vec![CodecWarning::MissingImageUrl { index: 0 }]
    );
}

#[test]
fn test_metrics_are_deterministic() {
    let doc = worked_example();

    assert_eq!(word_count(&doc), word_count(&doc));
    assert_eq!(
        reading_time(&doc, DEFAULT_WORDS_PER_MINUTE),
        reading_time(&doc, DEFAULT_WORDS_PER_MINUTE)
    );
    assert_eq!(excerpt(&doc, 3), excerpt(&doc, 3));

    assert!(reading_time(&doc, DEFAULT_WORDS_PER_MINUTE) >= 1);
    assert!(reading_time(&Document::new(), DEFAULT_WORDS_PER_MINUTE) >= 1);
}

#[test]
fn test_empty_paragraph_blocks_publish_only() {
    let doc = Document::from_blocks(vec![Block::paragraph("")]);

    assert_eq!(validate_for_publish(&doc), Err(ValidationError::EmptyContent));
    assert_eq!(validate_for_draft(&doc), Ok(()));
}

#[test]
fn test_unknown_block_is_kept_but_not_rendered() {
    let form = json!({
        "blocks": [
            { "type": "paragraph", "data": { "text": "Kept" } },
            { "type": "warning", "data": { "title": "Careful", "message": "Hot" } }
        ]
    });

    let decoded = decode(&form).unwrap();
    let blocks = decoded.document.blocks();
    assert_eq!(blocks.len(), 2);
    assert!(blocks[1].is_opaque());

    // Carried verbatim through a re-encode
    let reencoded = encode(&decoded.document).to_value().unwrap();
    assert_eq!(reencoded, form);

    let rendered = render(&decoded.document, &RenderOptions::default());
    assert_eq!(rendered.html, "<p>Kept</p>");
    assert!(!rendered.html.contains("Careful"));
    assert_eq!(
        rendered.warnings,
        vec![CodecWarning::UnknownBlockType {
            index: 1,
            tag: "warning".to_string()
        }]
    );
}

#[test]
fn test_snapshot_renders_like_document() {
    let mut doc = worked_example();
    let snapshot = doc.to_sequence();
    doc.insert_block(0, Block::paragraph("later edit"));

    assert_eq!(render_html(&snapshot), "<h1>Hello</h1><p>World</p>");
    assert_eq!(word_count(&snapshot), 2);
    assert_eq!(word_count(&doc), 4);
}
