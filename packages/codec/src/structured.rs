//! # Structured Form
//!
//! The persisted JSON shape of a document:
//!
//! ```json
//! { "blocks": [ { "type": "heading", "data": { "level": 1, "text": "Hello" } } ] }
//! ```
//!
//! Encoding keeps every block, empty paragraphs included, in document order.
//! Decoding is lenient per block: a malformed entry is skipped and reported,
//! an unknown type is kept as an opaque block.

use crate::content::ContentShape;
use crate::error::{CodecError, CodecWarning};
use scribe_document::{Block, Document, TaggedBlock};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, instrument, warn};

/// Persisted/transmitted representation of a document
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StructuredForm {
    /// Save timestamp in epoch milliseconds, as stamped by the browser editor
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<i64>,
    /// Editor build that produced the form
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub blocks: Vec<Block>,
}

impl StructuredForm {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self {
            blocks,
            ..Default::default()
        }
    }

    pub fn to_value(&self) -> Result<Value, CodecError> {
        Ok(serde_json::to_value(self)?)
    }
}

// Lenient on purpose: a stored form with one broken block still loads.
impl<'de> Deserialize<'de> for StructuredForm {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let decoded = decode(&value).map_err(serde::de::Error::custom)?;
        Ok(StructuredForm {
            time: value.get("time").and_then(Value::as_i64),
            version: value
                .get("version")
                .and_then(Value::as_str)
                .map(str::to_string),
            blocks: decoded.document.blocks().to_vec(),
        })
    }
}

/// Document produced by decoding, plus everything that was recovered from
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub document: Document,
    pub warnings: Vec<CodecWarning>,
    pub shape: ContentShape,
}

impl Decoded {
    pub(crate) fn new(shape: ContentShape) -> Self {
        Self {
            document: Document::new(),
            warnings: Vec::new(),
            shape,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Encode a document, reporting images that had to be left out
pub fn encode_with_warnings<D>(doc: &D) -> (StructuredForm, Vec<CodecWarning>)
where
    D: AsRef<[Block]> + ?Sized,
{
    let mut blocks = Vec::with_capacity(doc.as_ref().len());
    let mut warnings = Vec::new();

    for (index, block) in doc.as_ref().iter().enumerate() {
        match block {
            Block::Image(image) => match image.normalized() {
                Some(normalized) => blocks.push(Block::Image(normalized)),
                None => {
                    warn!(index, "leaving unresolved image out of structured form");
                    warnings.push(CodecWarning::UnresolvedImage { index });
                }
            },
            other => blocks.push(other.clone()),
        }
    }

    (StructuredForm::new(blocks), warnings)
}

/// Encode a document into its structured form
pub fn encode<D>(doc: &D) -> StructuredForm
where
    D: AsRef<[Block]> + ?Sized,
{
    encode_with_warnings(doc).0
}

pub fn encode_json<D>(doc: &D) -> Result<String, CodecError>
where
    D: AsRef<[Block]> + ?Sized,
{
    Ok(serde_json::to_string(&encode(doc))?)
}

/// Decode a structured form value.
///
/// Fails only when `form` is not a structured form at all; individual
/// entries never abort the decode.
#[instrument(skip_all)]
pub fn decode(form: &Value) -> Result<Decoded, CodecError> {
    let entries = match form {
        Value::Object(fields) => match fields.get("blocks") {
            Some(Value::Array(entries)) => entries.as_slice(),
            None | Some(Value::Null) => &[],
            Some(other) => {
                return Err(CodecError::UnrecognizedContent(format!(
                    "`blocks` must be an array, got {}",
                    json_type(other)
                )))
            }
        },
        other => {
            return Err(CodecError::UnrecognizedContent(format!(
                "structured form must be an object, got {}",
                json_type(other)
            )))
        }
    };

    let mut decoded = Decoded::new(ContentShape::Structured);
    let mut blocks = Vec::with_capacity(entries.len());

    for (index, entry) in entries.iter().enumerate() {
        match decode_entry(entry) {
            Ok(block) => {
                if let Block::Opaque(opaque) = &block {
                    debug!(index, tag = %opaque.tag, "keeping block of unknown type");
                }
                blocks.push(block);
            }
            Err(reason) => {
                warn!(index, %reason, "skipping malformed block");
                decoded
                    .warnings
                    .push(CodecWarning::MalformedBlock { index, reason });
            }
        }
    }

    decoded.document = Document::from_blocks(blocks);
    Ok(decoded)
}

pub fn decode_str(json: &str) -> Result<Decoded, CodecError> {
    let value: Value = serde_json::from_str(json)?;
    decode(&value)
}

fn decode_entry(entry: &Value) -> Result<Block, String> {
    let tagged: TaggedBlock = serde_json::from_value(entry.clone()).map_err(|e| e.to_string())?;
    Block::try_from(tagged).map_err(|e| e.to_string())
}

pub(crate) fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
