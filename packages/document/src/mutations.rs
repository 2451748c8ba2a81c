//! # Document Mutations
//!
//! Edit commands issued by the editor shell, one variant per structural
//! operation on a [`Document`].
//!
//! ## Mutation Semantics
//!
//! ### InsertBlock
//! - Index is clamped to `[0, len]`, never fails
//!
//! ### RemoveBlock / MoveBlock
//! - Fail with `OutOfRange` for any invalid index
//! - Moving a block onto itself is a no-op
//!
//! ### UpdateBlockData
//! - Shallow key-by-key merge into the payload
//! - Block type never changes
//! - Last write wins
//!
//! ### ToggleMark / ConvertBlock
//! - Only text-bearing blocks (heading, paragraph, list, quote, code)

use crate::{Block, BlockKind, Document, DocumentError, InlineMark};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Structural edit on a document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Mutation {
    /// Insert a block at index (clamped)
    InsertBlock { index: usize, block: Block },

    /// Remove the block at index
    RemoveBlock { index: usize },

    /// Merge a partial payload into the block at index
    UpdateBlockData {
        index: usize,
        patch: Map<String, Value>,
    },

    /// Move a block so it ends up at `to`
    MoveBlock { from: usize, to: usize },

    /// Toggle an inline mark over a block's rich text
    ToggleMark { index: usize, mark: InlineMark },

    /// Turn a text-bearing block into another text-bearing kind
    ConvertBlock { index: usize, kind: BlockKind },
}

impl Mutation {
    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::InsertBlock { .. } => "InsertBlock",
            Mutation::RemoveBlock { .. } => "RemoveBlock",
            Mutation::UpdateBlockData { .. } => "UpdateBlockData",
            Mutation::MoveBlock { .. } => "MoveBlock",
            Mutation::ToggleMark { .. } => "ToggleMark",
            Mutation::ConvertBlock { .. } => "ConvertBlock",
        }
    }

    /// Apply mutation to the document with validation
    pub fn apply(&self, doc: &mut Document) -> Result<(), DocumentError> {
        self.validate(doc)?;

        match self {
            Mutation::InsertBlock { index, block } => {
                doc.insert_block(*index, block.clone());
                Ok(())
            }
            Mutation::RemoveBlock { index } => doc.remove_block(*index).map(|_| ()),
            Mutation::UpdateBlockData { index, patch } => doc.update_block_data(*index, patch),
            Mutation::MoveBlock { from, to } => doc.move_block(*from, *to),
            Mutation::ToggleMark { index, mark } => doc.toggle_mark(*index, mark),
            Mutation::ConvertBlock { index, kind } => doc.convert_block(*index, *kind),
        }
    }

    /// Validate without applying
    pub fn validate(&self, doc: &Document) -> Result<(), DocumentError> {
        let in_range = |index: usize| {
            if index < doc.len() {
                Ok(())
            } else {
                Err(DocumentError::OutOfRange {
                    index,
                    len: doc.len(),
                })
            }
        };

        match self {
            Mutation::InsertBlock { .. } => Ok(()),
            Mutation::RemoveBlock { index } | Mutation::UpdateBlockData { index, .. } => {
                in_range(*index)
            }
            Mutation::MoveBlock { from, to } => {
                in_range(*from)?;
                in_range(*to)
            }
            Mutation::ToggleMark { index, .. } => {
                in_range(*index)?;
                let block = &doc.blocks()[*index];
                match block.kind() {
                    Some(kind) if kind.is_text_bearing() && kind != BlockKind::Code => Ok(()),
                    _ => Err(DocumentError::NotRichText {
                        index: *index,
                        tag: block.tag().to_string(),
                    }),
                }
            }
            Mutation::ConvertBlock { index, .. } => in_range(*index),
        }
    }
}

/// Result of applying a mutation
#[derive(Debug, Clone, PartialEq)]
pub struct MutationResult {
    /// New version number
    pub version: u64,
}
