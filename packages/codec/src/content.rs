//! Entry point for article content in whatever shape it was stored.

use crate::error::CodecError;
use crate::legacy::{decode_legacy_html, decode_tiptap};
use crate::structured::{self, json_type, Decoded};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

/// Shape the content was found in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContentShape {
    /// `{ "blocks": [...] }`
    Structured,
    /// `{ "type": "doc", "content": [...] }`
    LegacyTipTap,
    /// Flat HTML, either a bare string or `{ "html": "..." }`
    LegacyHtml,
    /// Null or blank content
    Empty,
}

impl ContentShape {
    pub fn is_legacy(self) -> bool {
        matches!(self, ContentShape::LegacyTipTap | ContentShape::LegacyHtml)
    }
}

/// Decode an article's `content` field
#[instrument(skip_all)]
pub fn decode_content(content: &Value) -> Result<Decoded, CodecError> {
    let decoded = match content {
        Value::Null => Decoded::new(ContentShape::Empty),
        Value::String(text) => return decode_content_str(text),
        Value::Object(fields) if fields.contains_key("blocks") => structured::decode(content)?,
        Value::Object(fields) if fields.get("type").and_then(Value::as_str) == Some("doc") => {
            decode_tiptap(content)?
        }
        Value::Object(fields) => match fields.get("html").and_then(Value::as_str) {
            Some(html) => decode_legacy_html(html),
            None => {
                return Err(CodecError::UnrecognizedContent(
                    "object has neither `blocks`, `type: doc` nor `html`".to_string(),
                ))
            }
        },
        other => {
            return Err(CodecError::UnrecognizedContent(format!(
                "content must be an object or string, got {}",
                json_type(other)
            )))
        }
    };

    debug!(shape = ?decoded.shape, blocks = decoded.document.len(), "decoded content");
    Ok(decoded)
}

/// Decode content that arrived as text: serialized JSON or legacy HTML
pub fn decode_content_str(content: &str) -> Result<Decoded, CodecError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Ok(Decoded::new(ContentShape::Empty));
    }

    if trimmed.starts_with('{') {
        if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(trimmed) {
            return decode_content(&value);
        }
    }

    Ok(decode_legacy_html(content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scribe_document::Block;
    use serde_json::json;

    #[test]
    fn test_dispatch_by_shape() {
        let structured = json!({ "blocks": [{ "type": "paragraph", "data": { "text": "a" } }] });
        let tiptap = json!({ "type": "doc", "content": [] });
        let html = json!({ "html": "<p>a</p>" });

        assert_eq!(decode_content(&structured).unwrap().shape, ContentShape::Structured);
        assert_eq!(decode_content(&tiptap).unwrap().shape, ContentShape::LegacyTipTap);
        assert_eq!(decode_content(&html).unwrap().shape, ContentShape::LegacyHtml);
        assert_eq!(decode_content(&Value::Null).unwrap().shape, ContentShape::Empty);
    }

    #[test]
    fn test_string_content() {
        let serialized = r#"{"blocks":[{"type":"delimiter","data":{}}]}"#;
        let decoded = decode_content(&json!(serialized)).unwrap();
        assert_eq!(decoded.shape, ContentShape::Structured);
        assert_eq!(decoded.document.blocks(), &[Block::delimiter()]);

        let html = decode_content_str("<h1>Hi</h1>").unwrap();
        assert_eq!(html.document.blocks(), &[Block::raw("<h1>Hi</h1>")]);
        assert!(html.shape.is_legacy());

        // Looks like JSON but is not: kept as markup
        let broken = decode_content_str("{not json").unwrap();
        assert_eq!(broken.document.blocks(), &[Block::raw("{not json")]);

        assert_eq!(decode_content_str("  ").unwrap().shape, ContentShape::Empty);
    }

    #[test]
    fn test_unrecognized_content() {
        assert!(matches!(
            decode_content(&json!(7)),
            Err(CodecError::UnrecognizedContent(_))
        ));
        assert!(matches!(
            decode_content(&json!({ "title": "x" })),
            Err(CodecError::UnrecognizedContent(_))
        ));
    }
}
