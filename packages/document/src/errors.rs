//! Error types for the document model

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DocumentError {
    #[error("Block index {index} out of range (document has {len} blocks)")]
    OutOfRange { index: usize, len: usize },

    #[error("Invalid patch for block {index}: {reason}")]
    InvalidPatch { index: usize, reason: String },

    #[error("Block {index} ({tag}) has no rich text")]
    NotRichText { index: usize, tag: String },

    #[error("Cannot convert a {from} block into {to}")]
    UnsupportedConversion { from: String, to: String },
}

/// A known block tag whose payload does not match its schema
#[derive(Error, Debug)]
#[error("Invalid `{tag}` payload: {source}")]
pub struct PayloadError {
    pub tag: String,
    #[source]
    pub source: serde_json::Error,
}
