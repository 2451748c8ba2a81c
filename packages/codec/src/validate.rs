use crate::metrics::block_text;
use scribe_document::Block;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Article has no content: add some text before publishing")]
    EmptyContent,
}

/// What the document is about to be used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    Draft,
    Publish,
}

/// True when at least one block carries non-whitespace visible text
pub fn has_visible_text<D>(doc: &D) -> bool
where
    D: AsRef<[Block]> + ?Sized,
{
    doc.as_ref()
        .iter()
        .any(|block| !block_text(block).trim().is_empty())
}

pub fn validate_for_publish<D>(doc: &D) -> Result<(), ValidationError>
where
    D: AsRef<[Block]> + ?Sized,
{
    if has_visible_text(doc) {
        Ok(())
    } else {
        debug!(blocks = doc.as_ref().len(), "publish rejected: no visible text");
        Err(ValidationError::EmptyContent)
    }
}

/// Drafts may be saved in any state, including empty
pub fn validate_for_draft<D>(_doc: &D) -> Result<(), ValidationError>
where
    D: AsRef<[Block]> + ?Sized,
{
    Ok(())
}

pub fn validate<D>(doc: &D, mode: ValidationMode) -> Result<(), ValidationError>
where
    D: AsRef<[Block]> + ?Sized,
{
    match mode {
        ValidationMode::Draft => validate_for_draft(doc),
        ValidationMode::Publish => validate_for_publish(doc),
    }
}
