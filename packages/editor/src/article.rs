//! # Articles
//!
//! The persisted article record and the payload the editor sends to create
//! or update one. Field names are snake_case on the wire to match the
//! articles API.

use chrono::{DateTime, Utc};
use scribe_codec::{
    decode_content, encode_with_warnings, CodecError, CodecWarning, Decoded, MetricsEngine,
    StructuredForm,
};
use scribe_document::Document;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

/// Article as returned by the persistence layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author_name: String,
    /// Structured form, legacy TipTap tree, or legacy HTML string
    #[serde(default)]
    pub content: Value,
    #[serde(default)]
    pub status: ArticleStatus,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub reading_time: u32,
    #[serde(default)]
    pub featured_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Article {
    /// Decode the stored content into an editable document
    pub fn decode(&self) -> Result<Decoded, CodecError> {
        decode_content(&self.content)
    }
}

/// Values the author typed into the article settings panel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleSettings {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author_name: String,
    #[serde(default)]
    pub excerpt: String,
    /// Comma-separated
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub featured_image: Option<String>,
}

impl ArticleSettings {
    pub fn from_article(article: &Article) -> Self {
        Self {
            title: article.title.clone(),
            author_name: article.author_name.clone(),
            excerpt: article.excerpt.clone().unwrap_or_default(),
            tags: article.tags.iter().cloned().collect::<Vec<_>>().join(", "),
            featured_image: article.featured_image_url.clone(),
        }
    }
}

/// Body of a create/update request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavePayload {
    pub title: String,
    pub author_name: String,
    pub content: StructuredForm,
    pub status: ArticleStatus,
    pub excerpt: String,
    pub tags: BTreeSet<String>,
    pub reading_time: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured_image_url: Option<String>,
}

impl SavePayload {
    /// Build the payload for `doc`, filling blank settings from the content.
    ///
    /// Returns the codec warnings for blocks that could not be persisted yet.
    pub fn build(
        doc: &Document,
        settings: &ArticleSettings,
        status: ArticleStatus,
        engine: &MetricsEngine,
    ) -> (Self, Vec<CodecWarning>) {
        let (content, warnings) = encode_with_warnings(doc);
        let metrics = engine.measure(doc);
        let config = engine.config();

        let payload = Self {
            title: non_blank(&settings.title).unwrap_or_else(|| engine.title(doc)),
            author_name: non_blank(&settings.author_name)
                .unwrap_or_else(|| config.default_author.clone()),
            content,
            status,
            excerpt: non_blank(&settings.excerpt).unwrap_or(metrics.excerpt),
            tags: parse_tags(&settings.tags),
            reading_time: metrics.reading_time,
            featured_image_url: settings.featured_image.as_deref().and_then(non_blank),
        };

        (payload, warnings)
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Split comma-separated tag input: trimmed, blanks dropped, duplicates merged
pub fn parse_tags(input: &str) -> BTreeSet<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}
