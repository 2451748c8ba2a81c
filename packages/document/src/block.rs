//! # Blocks
//!
//! A block is one typed unit of article content. The set of block kinds is
//! closed; anything the editor emits outside that set is carried as an
//! [`OpaqueBlock`] so it survives a load/save cycle untouched.
//!
//! Blocks serialize as `{ "type": <tag>, "data": <payload> }`.

use crate::errors::PayloadError;
use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

pub const MIN_HEADING_LEVEL: u8 = 1;
pub const MAX_HEADING_LEVEL: u8 = 6;
pub const DEFAULT_HEADING_LEVEL: u8 = 2;

/// Closed set of block kinds understood by the document model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Heading,
    Paragraph,
    List,
    Quote,
    Code,
    Delimiter,
    Image,
    Embed,
    Raw,
}

impl BlockKind {
    pub const ALL: [BlockKind; 9] = [
        BlockKind::Heading,
        BlockKind::Paragraph,
        BlockKind::List,
        BlockKind::Quote,
        BlockKind::Code,
        BlockKind::Delimiter,
        BlockKind::Image,
        BlockKind::Embed,
        BlockKind::Raw,
    ];

    /// Canonical serialized tag
    pub fn tag(self) -> &'static str {
        match self {
            BlockKind::Heading => "heading",
            BlockKind::Paragraph => "paragraph",
            BlockKind::List => "list",
            BlockKind::Quote => "quote",
            BlockKind::Code => "code",
            BlockKind::Delimiter => "delimiter",
            BlockKind::Image => "image",
            BlockKind::Embed => "embed",
            BlockKind::Raw => "raw",
        }
    }

    /// Resolve a serialized tag. `header` is what older editor builds wrote
    /// for headings.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "heading" | "header" => Some(BlockKind::Heading),
            "paragraph" => Some(BlockKind::Paragraph),
            "list" => Some(BlockKind::List),
            "quote" => Some(BlockKind::Quote),
            "code" => Some(BlockKind::Code),
            "delimiter" => Some(BlockKind::Delimiter),
            "image" => Some(BlockKind::Image),
            "embed" => Some(BlockKind::Embed),
            "raw" => Some(BlockKind::Raw),
            _ => None,
        }
    }

    /// Kinds whose payload is editable text
    pub fn is_text_bearing(self) -> bool {
        matches!(
            self,
            BlockKind::Heading
                | BlockKind::Paragraph
                | BlockKind::List
                | BlockKind::Quote
                | BlockKind::Code
        )
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

pub fn clamp_heading_level(level: i64) -> u8 {
    level.clamp(MIN_HEADING_LEVEL as i64, MAX_HEADING_LEVEL as i64) as u8
}

fn default_heading_level() -> u8 {
    DEFAULT_HEADING_LEVEL
}

// Levels arrive as numbers, numeric strings or null depending on the editor build.
fn deserialize_heading_level<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let level = match &value {
        Value::Null => Some(DEFAULT_HEADING_LEVEL as i64),
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };

    level
        .map(clamp_heading_level)
        .ok_or_else(|| D::Error::custom(format!("invalid heading level: {}", value)))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadingData {
    #[serde(
        default = "default_heading_level",
        deserialize_with = "deserialize_heading_level"
    )]
    pub(crate) level: u8,
    #[serde(default)]
    pub text: String,
}

impl HeadingData {
    pub fn new(level: i64, text: impl Into<String>) -> Self {
        Self {
            level: clamp_heading_level(level),
            text: text.into(),
        }
    }

    /// Always within `1..=6`
    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn set_level(&mut self, level: i64) {
        self.level = clamp_heading_level(level);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParagraphData {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListStyle {
    Ordered,
    #[default]
    Unordered,
}

// Newer list tools store items as `{ content, items }` trees; flatten them
// depth-first into plain rich-text strings.
fn deserialize_list_items<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    fn collect(value: &Value, out: &mut Vec<String>) -> Result<(), String> {
        match value {
            Value::String(s) => {
                out.push(s.clone());
                Ok(())
            }
            Value::Object(obj) => {
                match obj.get("content") {
                    Some(Value::String(s)) => out.push(s.clone()),
                    None | Some(Value::Null) => {}
                    Some(other) => return Err(format!("invalid list item content: {}", other)),
                }
                if let Some(Value::Array(children)) = obj.get("items") {
                    for child in children {
                        collect(child, out)?;
                    }
                }
                Ok(())
            }
            other => Err(format!("invalid list item: {}", other)),
        }
    }

    let value = Value::deserialize(deserializer)?;
    let mut items = Vec::new();
    match &value {
        Value::Null => {}
        Value::Array(entries) => {
            for entry in entries {
                collect(entry, &mut items).map_err(D::Error::custom)?;
            }
        }
        other => return Err(D::Error::custom(format!("list items must be an array, got {}", other))),
    }
    Ok(items)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListData {
    #[serde(default)]
    pub style: ListStyle,
    #[serde(default, deserialize_with = "deserialize_list_items")]
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteData {
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeData {
    #[serde(default)]
    pub code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DelimiterData {}

/// Deferred file reference held by an image block while its upload is in flight
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<ImageFile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

impl ImageData {
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Default::default()
        }
    }

    /// Image waiting on an upload; not renderable or persistable yet
    pub fn pending(file_name: impl Into<String>) -> Self {
        Self {
            file: Some(ImageFile {
                url: None,
                name: Some(file_name.into()),
            }),
            ..Default::default()
        }
    }

    /// URL to display, preferring `url` over an uploaded `file.url`
    pub fn resolved_url(&self) -> Option<&str> {
        let direct = self.url.as_deref().filter(|u| !u.trim().is_empty());
        direct.or_else(|| {
            self.file
                .as_ref()
                .and_then(|f| f.url.as_deref())
                .filter(|u| !u.trim().is_empty())
        })
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved_url().is_some()
    }

    /// Persistable form: `file.url` promoted into `url`, file reference dropped.
    /// `None` while the image is still unresolved.
    pub fn normalized(&self) -> Option<ImageData> {
        let url = self.resolved_url()?.to_string();
        Some(ImageData {
            url: Some(url),
            file: None,
            caption: self.caption.clone(),
            alt: self.alt.clone(),
        })
    }
}

/// Third-party embed. Everything besides `embed` and `caption` is kept as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmbedData {
    #[serde(default)]
    pub embed: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawData {
    #[serde(default)]
    pub html: String,
}

/// Block with a tag outside the closed set, carried verbatim
#[derive(Debug, Clone, PartialEq)]
pub struct OpaqueBlock {
    pub tag: String,
    pub data: Value,
}

/// One typed unit of article content
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Heading(HeadingData),
    Paragraph(ParagraphData),
    List(ListData),
    Quote(QuoteData),
    Code(CodeData),
    Delimiter(DelimiterData),
    Image(ImageData),
    Embed(EmbedData),
    Raw(RawData),
    Opaque(OpaqueBlock),
}

impl Block {
    pub fn heading(level: i64, text: impl Into<String>) -> Self {
        Block::Heading(HeadingData::new(level, text))
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Block::Paragraph(ParagraphData { text: text.into() })
    }

    pub fn list(style: ListStyle, items: Vec<String>) -> Self {
        Block::List(ListData { style, items })
    }

    pub fn quote(text: impl Into<String>, caption: Option<String>) -> Self {
        Block::Quote(QuoteData {
            text: text.into(),
            caption,
        })
    }

    pub fn code(code: impl Into<String>) -> Self {
        Block::Code(CodeData { code: code.into() })
    }

    pub fn delimiter() -> Self {
        Block::Delimiter(DelimiterData {})
    }

    pub fn image(url: impl Into<String>) -> Self {
        Block::Image(ImageData::with_url(url))
    }

    pub fn embed(embed: impl Into<String>) -> Self {
        Block::Embed(EmbedData {
            embed: embed.into(),
            ..Default::default()
        })
    }

    pub fn raw(html: impl Into<String>) -> Self {
        Block::Raw(RawData { html: html.into() })
    }

    /// Kind of this block, `None` for opaque blocks
    pub fn kind(&self) -> Option<BlockKind> {
        match self {
            Block::Heading(_) => Some(BlockKind::Heading),
            Block::Paragraph(_) => Some(BlockKind::Paragraph),
            Block::List(_) => Some(BlockKind::List),
            Block::Quote(_) => Some(BlockKind::Quote),
            Block::Code(_) => Some(BlockKind::Code),
            Block::Delimiter(_) => Some(BlockKind::Delimiter),
            Block::Image(_) => Some(BlockKind::Image),
            Block::Embed(_) => Some(BlockKind::Embed),
            Block::Raw(_) => Some(BlockKind::Raw),
            Block::Opaque(_) => None,
        }
    }

    /// Serialized type tag
    pub fn tag(&self) -> &str {
        match self {
            Block::Opaque(opaque) => &opaque.tag,
            other => other.kind().map(BlockKind::tag).unwrap_or_default(),
        }
    }

    pub fn is_opaque(&self) -> bool {
        matches!(self, Block::Opaque(_))
    }

    /// Payload as a JSON value
    pub fn data_value(&self) -> Result<Value, serde_json::Error> {
        match self {
            Block::Heading(d) => serde_json::to_value(d),
            Block::Paragraph(d) => serde_json::to_value(d),
            Block::List(d) => serde_json::to_value(d),
            Block::Quote(d) => serde_json::to_value(d),
            Block::Code(d) => serde_json::to_value(d),
            Block::Delimiter(d) => serde_json::to_value(d),
            Block::Image(d) => serde_json::to_value(d),
            Block::Embed(d) => serde_json::to_value(d),
            Block::Raw(d) => serde_json::to_value(d),
            Block::Opaque(o) => Ok(o.data.clone()),
        }
    }

    /// Build a block from a type tag and a raw payload.
    ///
    /// Unknown tags never fail; they produce an opaque block. A missing
    /// payload is treated as an empty object.
    pub fn from_tagged(tag: &str, data: Value) -> Result<Block, PayloadError> {
        let Some(kind) = BlockKind::from_tag(tag) else {
            return Ok(Block::Opaque(OpaqueBlock {
                tag: tag.to_string(),
                data,
            }));
        };

        let data = match data {
            Value::Null => Value::Object(Map::new()),
            other => other,
        };

        let wrap = |source: serde_json::Error| PayloadError {
            tag: tag.to_string(),
            source,
        };

        let block = match kind {
            BlockKind::Heading => Block::Heading(serde_json::from_value(data).map_err(wrap)?),
            BlockKind::Paragraph => Block::Paragraph(serde_json::from_value(data).map_err(wrap)?),
            BlockKind::List => Block::List(serde_json::from_value(data).map_err(wrap)?),
            BlockKind::Quote => Block::Quote(serde_json::from_value(data).map_err(wrap)?),
            BlockKind::Code => Block::Code(serde_json::from_value(data).map_err(wrap)?),
            BlockKind::Delimiter => Block::Delimiter(serde_json::from_value(data).map_err(wrap)?),
            BlockKind::Image => Block::Image(serde_json::from_value(data).map_err(wrap)?),
            BlockKind::Embed => Block::Embed(serde_json::from_value(data).map_err(wrap)?),
            BlockKind::Raw => Block::Raw(serde_json::from_value(data).map_err(wrap)?),
        };

        Ok(block)
    }
}

impl Serialize for Block {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("type", self.tag())?;
        match self {
            Block::Heading(d) => map.serialize_entry("data", d)?,
            Block::Paragraph(d) => map.serialize_entry("data", d)?,
            Block::List(d) => map.serialize_entry("data", d)?,
            Block::Quote(d) => map.serialize_entry("data", d)?,
            Block::Code(d) => map.serialize_entry("data", d)?,
            Block::Delimiter(d) => map.serialize_entry("data", d)?,
            Block::Image(d) => map.serialize_entry("data", d)?,
            Block::Embed(d) => map.serialize_entry("data", d)?,
            Block::Raw(d) => map.serialize_entry("data", d)?,
            Block::Opaque(o) => map.serialize_entry("data", &o.data)?,
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Block {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tagged = TaggedBlock::deserialize(deserializer)?;
        Block::try_from(tagged).map_err(D::Error::custom)
    }
}

/// Untyped `{ type, data }` envelope as it appears on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedBlock {
    #[serde(rename = "type")]
    pub tag: String,
    #[serde(default)]
    pub data: Value,
}

impl TryFrom<TaggedBlock> for Block {
    type Error = PayloadError;

    fn try_from(tagged: TaggedBlock) -> Result<Self, Self::Error> {
        Block::from_tagged(&tagged.tag, tagged.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_heading_level_clamps() {
        assert_eq!(HeadingData::new(0, "a").level(), 1);
        assert_eq!(HeadingData::new(9, "a").level(), 6);
        assert_eq!(HeadingData::new(3, "a").level(), 3);

        let mut heading = HeadingData::new(2, "a");
        heading.set_level(-4);
        assert_eq!(heading.level(), 1);

        let block = Block::from_tagged("heading", json!({ "level": 12, "text": "Big" })).unwrap();
        assert_eq!(block, Block::heading(6, "Big"));
    }

    #[test]
    fn test_heading_level_accepts_strings_and_defaults() {
        let block = Block::from_tagged("header", json!({ "level": "3", "text": "x" })).unwrap();
        assert_eq!(block, Block::heading(3, "x"));

        let block = Block::from_tagged("heading", json!({ "text": "x" })).unwrap();
        assert_eq!(block, Block::heading(2, "x"));
    }

    #[test]
    fn test_unknown_tag_is_opaque() {
        let data = json!({ "rows": [[1, 2]] });
        let block = Block::from_tagged("table", data.clone()).unwrap();
        assert_eq!(
            block,
            Block::Opaque(OpaqueBlock {
                tag: "table".to_string(),
                data
            })
        );
        assert_eq!(block.tag(), "table");
        assert!(block.kind().is_none());
    }

    #[test]
    fn test_ill_typed_payload_is_rejected() {
        let err = Block::from_tagged("paragraph", json!({ "text": 42 })).unwrap_err();
        assert_eq!(err.tag, "paragraph");

        assert!(Block::from_tagged("list", json!({ "items": "nope" })).is_err());
    }

    #[test]
    fn test_nested_list_items_flatten() {
        let block = Block::from_tagged(
            "list",
            json!({
                "style": "ordered",
                "items": [
                    { "content": "one", "items": [{ "content": "one.a", "items": [] }] },
                    "two"
                ]
            }),
        )
        .unwrap();

        assert_eq!(
            block,
            Block::list(
                ListStyle::Ordered,
                vec!["one".to_string(), "one.a".to_string(), "two".to_string()]
            )
        );
    }

    #[test]
    fn test_serialize_shape() {
        let value = serde_json::to_value(Block::heading(1, "Hello")).unwrap();
        assert_eq!(value, json!({ "type": "heading", "data": { "level": 1, "text": "Hello" } }));

        let value = serde_json::to_value(Block::delimiter()).unwrap();
        assert_eq!(value, json!({ "type": "delimiter", "data": {} }));
    }

    #[test]
    fn test_image_resolution() {
        let pending = ImageData::pending("cat.png");
        assert!(!pending.is_resolved());
        assert!(pending.normalized().is_none());

        let uploaded = ImageData {
            file: Some(ImageFile {
                url: Some("https://cdn/cat.png".to_string()),
                name: None,
            }),
            caption: Some("Cat".to_string()),
            ..Default::default()
        };
        let normalized = uploaded.normalized().unwrap();
        assert_eq!(normalized.url.as_deref(), Some("https://cdn/cat.png"));
        assert!(normalized.file.is_none());
        assert_eq!(normalized.caption.as_deref(), Some("Cat"));
    }

    #[test]
    fn test_embed_keeps_extra_keys() {
        let data = json!({
            "service": "youtube",
            "source": "https://youtu.be/x",
            "embed": "https://www.youtube.com/embed/x",
            "width": 580
        });
        let block = Block::from_tagged("embed", data.clone()).unwrap();
        assert_eq!(block.data_value().unwrap(), data);
    }
}
