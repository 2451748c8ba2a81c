use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Errors that stop a codec operation outright
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unrecognized content: {0}")]
    UnrecognizedContent(String),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

pub type CodecResult<T> = Result<T, CodecError>;

/// Errors loading a [`crate::CodecConfig`]
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Recovered condition: the offending block was skipped or omitted
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CodecWarning {
    /// Structured-form entry that could not be decoded
    MalformedBlock { index: usize, reason: String },

    /// Block with a tag outside the closed set, omitted from markup
    UnknownBlockType { index: usize, tag: String },

    /// Image without a resolvable URL, omitted from markup
    MissingImageUrl { index: usize },

    /// Image still waiting on its upload, left out of the structured form
    UnresolvedImage { index: usize },
}

impl fmt::Display for CodecWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecWarning::MalformedBlock { index, reason } => {
                write!(f, "block {} skipped: {}", index, reason)
            }
            CodecWarning::UnknownBlockType { index, tag } => {
                write!(f, "block {} has unknown type `{}`", index, tag)
            }
            CodecWarning::MissingImageUrl { index } => {
                write!(f, "image block {} has no url", index)
            }
            CodecWarning::UnresolvedImage { index } => {
                write!(f, "image block {} is still uploading", index)
            }
        }
    }
}
