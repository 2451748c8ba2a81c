//! # Legacy Content
//!
//! Articles written before the block editor were stored either as a TipTap
//! node tree (`{ "type": "doc", "content": [...] }`) or as a flat HTML
//! string. Both decode into ordinary documents; nothing ever encodes back
//! into these shapes.
//!
//! One TipTap variant wrapped an entire HTML body in a single text node of a
//! single paragraph. That shape decodes to one `raw` block so the markup is
//! not escaped into visible text.

use crate::content::ContentShape;
use crate::error::{CodecError, CodecWarning};
use crate::structured::{json_type, Decoded};
use crate::text::escape_html;
use scribe_document::{
    Block, CodeData, Document, ImageData, InlineMark, ListData, ListStyle, OpaqueBlock, QuoteData,
};
use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};

const LINE_BREAK: &str = "<br>";

/// Decode a flat HTML body
pub fn decode_legacy_html(html: &str) -> Decoded {
    if html.trim().is_empty() {
        return Decoded::new(ContentShape::Empty);
    }
    let mut decoded = Decoded::new(ContentShape::LegacyHtml);
    decoded.document = Document::from_blocks(vec![Block::raw(html)]);
    decoded
}

/// Decode a TipTap document tree
#[instrument(skip_all)]
pub fn decode_tiptap(tree: &Value) -> Result<Decoded, CodecError> {
    let root = tree.as_object().ok_or_else(|| {
        CodecError::UnrecognizedContent(format!("expected a doc node, got {}", json_type(tree)))
    })?;
    if node_type(root) != Some("doc") {
        return Err(CodecError::UnrecognizedContent(
            "TipTap content must have type `doc`".to_string(),
        ));
    }

    let nodes = children(root);

    if let Some(html) = wrapped_html(nodes) {
        debug!("decoding single-paragraph html wrapper as raw block");
        let mut decoded = Decoded::new(ContentShape::LegacyTipTap);
        decoded.document = Document::from_blocks(vec![Block::raw(html)]);
        return Ok(decoded);
    }

    let mut decoded = Decoded::new(ContentShape::LegacyTipTap);
    let mut blocks = Vec::with_capacity(nodes.len());

    for (index, node) in nodes.iter().enumerate() {
        match node.as_object() {
            Some(node) => blocks.extend(decode_node(node)),
            None => {
                let reason = format!("expected a node object, got {}", json_type(node));
                warn!(index, %reason, "skipping malformed legacy node");
                decoded
                    .warnings
                    .push(CodecWarning::MalformedBlock { index, reason });
            }
        }
    }

    decoded.document = Document::from_blocks(blocks);
    Ok(decoded)
}

fn node_type(node: &Map<String, Value>) -> Option<&str> {
    node.get("type").and_then(Value::as_str)
}

fn children(node: &Map<String, Value>) -> &[Value] {
    node.get("content")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn attr<'a>(node: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    node.get("attrs").and_then(|attrs| attrs.get(name))
}

fn attr_str(node: &Map<String, Value>, name: &str) -> Option<String> {
    attr(node, name)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// `[paragraph [text "<h1>..."]]` with no marks
fn wrapped_html(nodes: &[Value]) -> Option<&str> {
    let [paragraph] = nodes else { return None };
    let paragraph = paragraph.as_object()?;
    if node_type(paragraph) != Some("paragraph") {
        return None;
    }
    let [text] = children(paragraph) else { return None };
    let text = text.as_object()?;
    let has_marks = text
        .get("marks")
        .and_then(Value::as_array)
        .is_some_and(|marks| !marks.is_empty());
    if node_type(text) != Some("text") || has_marks {
        return None;
    }
    text.get("text")
        .and_then(Value::as_str)
        .filter(|s| starts_with_tag(s))
}

/// `<p>`, `</div>` or `<!-- -->`, as opposed to text such as `<3`
fn starts_with_tag(text: &str) -> bool {
    let mut chars = text.trim_start().chars();
    chars.next() == Some('<')
        && chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '/' || c == '!')
}

fn decode_node(node: &Map<String, Value>) -> Vec<Block> {
    match node_type(node).unwrap_or_default() {
        "paragraph" => vec![Block::paragraph(inline_markup(children(node)))],
        "heading" => {
            let level = attr(node, "level").and_then(Value::as_i64).unwrap_or(2);
            vec![Block::heading(level, inline_markup(children(node)))]
        }
        "bulletList" => vec![list_block(node, ListStyle::Unordered)],
        "orderedList" => vec![list_block(node, ListStyle::Ordered)],
        "blockquote" => vec![Block::Quote(QuoteData {
            text: joined_text(children(node)),
            caption: None,
        })],
        "codeBlock" => vec![Block::Code(CodeData {
            code: plain_text(children(node)),
        })],
        "horizontalRule" => vec![Block::delimiter()],
        "image" => vec![Block::Image(ImageData {
            url: attr_str(node, "src"),
            alt: attr_str(node, "alt"),
            caption: attr_str(node, "title"),
            ..Default::default()
        })],
        other => {
            debug!(node = other, "keeping unknown legacy node as opaque block");
            vec![Block::Opaque(OpaqueBlock {
                tag: other.to_string(),
                data: Value::Object(node.clone()),
            })]
        }
    }
}

fn list_block(node: &Map<String, Value>, style: ListStyle) -> Block {
    let mut items = Vec::new();
    collect_list_items(node, &mut items);
    Block::List(ListData { style, items })
}

// Nested lists flatten depth-first into the parent's items.
fn collect_list_items(list: &Map<String, Value>, items: &mut Vec<String>) {
    for item in children(list).iter().filter_map(Value::as_object) {
        let mut lines = Vec::new();
        for child in children(item).iter().filter_map(Value::as_object) {
            match node_type(child) {
                Some("bulletList") | Some("orderedList") => {
                    if !lines.is_empty() {
                        items.push(lines.join(LINE_BREAK));
                        lines.clear();
                    }
                    collect_list_items(child, items);
                }
                _ => lines.push(inline_markup(children(child))),
            }
        }
        if !lines.is_empty() {
            items.push(lines.join(LINE_BREAK));
        }
    }
}

/// Inline markup of each child block joined by line breaks
fn joined_text(nodes: &[Value]) -> String {
    nodes
        .iter()
        .filter_map(Value::as_object)
        .map(|child| inline_markup(children(child)))
        .collect::<Vec<_>>()
        .join(LINE_BREAK)
}

fn plain_text(nodes: &[Value]) -> String {
    nodes
        .iter()
        .filter_map(|node| node.get("text").and_then(Value::as_str))
        .collect()
}

/// Rich-text markup for a run of inline nodes
fn inline_markup(nodes: &[Value]) -> String {
    let mut out = String::new();
    for node in nodes.iter().filter_map(Value::as_object) {
        match node_type(node) {
            Some("text") => {
                let text = node.get("text").and_then(Value::as_str).unwrap_or_default();
                let mut markup = escape_html(text);
                let marks = node.get("marks").and_then(Value::as_array);
                for mark in marks.into_iter().flatten().filter_map(inline_mark) {
                    markup = mark.apply(&markup);
                }
                out.push_str(&markup);
            }
            Some("hardBreak") => out.push_str(LINE_BREAK),
            _ => out.push_str(&inline_markup(children(node))),
        }
    }
    out
}

fn inline_mark(mark: &Value) -> Option<InlineMark> {
    let mark = mark.as_object()?;
    let mark = match node_type(mark)? {
        "bold" | "strong" => InlineMark::Bold,
        "italic" | "em" => InlineMark::Italic,
        "underline" => InlineMark::Underline,
        "strike" => InlineMark::Strike,
        "code" => InlineMark::Code,
        "highlight" => InlineMark::Marker,
        "link" => InlineMark::Link {
            href: attr_str(mark, "href")?,
        },
        _ => return None,
    };
    Some(mark)
}
