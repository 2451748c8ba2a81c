//! # Metrics
//!
//! Derived text measurements. All of them start from [`blocks_to_text`] so
//! word count, reading time and excerpt always agree with each other.

use crate::config::CodecConfig;
use crate::text::{markup_text, strip_tags, visible_text};
use scribe_document::Block;
use serde::{Deserialize, Serialize};

pub const DEFAULT_EXCERPT_LENGTH: usize = 160;

pub const DEFAULT_ELLIPSIS: &str = "…";

/// Title used when a document has no usable heading
pub const UNTITLED_TITLE: &str = "Untitled Article";

/// Visible text of a single block, empty for blocks without text
pub fn block_text(block: &Block) -> String {
    match block {
        Block::Heading(heading) => visible_text(&heading.text),
        Block::Paragraph(paragraph) => visible_text(&paragraph.text),
        Block::List(list) => list
            .items
            .iter()
            .map(|item| visible_text(item))
            .filter(|item| !item.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" "),
        Block::Quote(quote) => visible_text(&quote.text),
        Block::Code(code) => strip_tags(&code.code),
        Block::Raw(raw) => markup_text(&raw.html),
        Block::Delimiter(_) | Block::Image(_) | Block::Embed(_) | Block::Opaque(_) => String::new(),
    }
}

/// Visible text of a whole document, blocks separated by one space
pub fn blocks_to_text<D>(doc: &D) -> String
where
    D: AsRef<[Block]> + ?Sized,
{
    let parts: Vec<String> = doc
        .as_ref()
        .iter()
        .map(block_text)
        .filter(|text| !text.trim().is_empty())
        .collect();

    parts.join(" ").trim().to_string()
}

pub fn word_count<D>(doc: &D) -> usize
where
    D: AsRef<[Block]> + ?Sized,
{
    blocks_to_text(doc).split_whitespace().count()
}

/// Minutes to read at `words_per_minute`, never less than one
pub fn reading_time<D>(doc: &D, words_per_minute: u32) -> u32
where
    D: AsRef<[Block]> + ?Sized,
{
    minutes_for(word_count(doc), words_per_minute)
}

fn minutes_for(words: usize, words_per_minute: u32) -> u32 {
    let wpm = words_per_minute.max(1) as usize;
    let minutes = (words + wpm - 1) / wpm;
    u32::try_from(minutes).unwrap_or(u32::MAX).max(1)
}

pub fn excerpt<D>(doc: &D, max_length: usize) -> String
where
    D: AsRef<[Block]> + ?Sized,
{
    excerpt_with(doc, max_length, DEFAULT_ELLIPSIS)
}

/// First `max_length` characters of the document text, with `ellipsis`
/// appended only when something was cut
pub fn excerpt_with<D>(doc: &D, max_length: usize, ellipsis: &str) -> String
where
    D: AsRef<[Block]> + ?Sized,
{
    truncate_chars(&blocks_to_text(doc), max_length, ellipsis)
}

fn truncate_chars(text: &str, max_length: usize, ellipsis: &str) -> String {
    match text.char_indices().nth(max_length) {
        Some((cut, _)) => format!("{}{}", &text[..cut], ellipsis),
        None => text.to_string(),
    }
}

/// Visible text of the first heading block, whatever it contains
pub fn first_heading_text<D>(doc: &D) -> Option<String>
where
    D: AsRef<[Block]> + ?Sized,
{
    doc.as_ref().iter().find_map(|block| match block {
        Block::Heading(heading) => Some(visible_text(&heading.text).trim().to_string()),
        _ => None,
    })
}

pub fn infer_title<D>(doc: &D) -> String
where
    D: AsRef<[Block]> + ?Sized,
{
    infer_title_with(doc, UNTITLED_TITLE)
}

pub fn infer_title_with<D>(doc: &D, fallback: &str) -> String
where
    D: AsRef<[Block]> + ?Sized,
{
    first_heading_text(doc)
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

/// Metrics sent alongside a save and stored with local drafts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub word_count: usize,
    pub reading_time: u32,
    pub excerpt: String,
}

/// Computes metrics with configured reading speed and excerpt settings
#[derive(Debug, Clone, Default)]
pub struct MetricsEngine {
    config: CodecConfig,
}

impl MetricsEngine {
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    pub fn measure<D>(&self, doc: &D) -> Metrics
    where
        D: AsRef<[Block]> + ?Sized,
    {
        let text = blocks_to_text(doc);
        let words = text.split_whitespace().count();

        Metrics {
            word_count: words,
            reading_time: minutes_for(words, self.config.words_per_minute),
            excerpt: truncate_chars(&text, self.config.excerpt_length, &self.config.ellipsis),
        }
    }

    pub fn reading_time<D>(&self, doc: &D) -> u32
    where
        D: AsRef<[Block]> + ?Sized,
    {
        reading_time(doc, self.config.words_per_minute)
    }

    pub fn excerpt<D>(&self, doc: &D) -> String
    where
        D: AsRef<[Block]> + ?Sized,
    {
        excerpt_with(doc, self.config.excerpt_length, &self.config.ellipsis)
    }

    pub fn title<D>(&self, doc: &D) -> String
    where
        D: AsRef<[Block]> + ?Sized,
    {
        infer_title_with(doc, &self.config.untitled_title)
    }
}
