//! Error types for the editor

use crate::backend::UpstreamFailure;
use crate::draft::DraftError;
use scribe_codec::{CodecError, ValidationError};
use scribe_document::DocumentError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Edit error: {0}")]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Content error: {0}")]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Upstream(#[from] UpstreamFailure),

    #[error("Draft error: {0}")]
    Draft(#[from] DraftError),

    #[error("Block {index} is not an image")]
    NotAnImage { index: usize },
}

impl EditorError {
    /// The content did not reach the server
    pub fn is_upstream(&self) -> bool {
        matches!(self, EditorError::Upstream(_))
    }

    /// Publishing was refused before any request because there is nothing to publish
    pub fn is_empty_content(&self) -> bool {
        matches!(self, EditorError::Validation(ValidationError::EmptyContent))
    }
}
