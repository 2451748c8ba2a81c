//! # Document
//!
//! Ordered sequence of blocks forming one article body. The sequence order
//! is the canonical reading order.
//!
//! ## Lifecycle
//!
//! ```text
//! Open → Edit → Snapshot → Encode
//!   ↓      ↓        ↓         ↓
//! placeholder  Mutations  BlockSequence  structured form
//! ```
//!
//! A document has exactly one owner (the editing session). Readers that
//! run alongside edits take a [`BlockSequence`] snapshot first.

use crate::block::{Block, BlockKind, CodeData, HeadingData, ListData, ParagraphData, QuoteData};
use crate::block::DEFAULT_HEADING_LEVEL;
use crate::{DocumentError, InlineMark, Mutation, MutationResult};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Editable article body
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    /// Current version number (increments on each applied mutation)
    pub version: u64,

    blocks: Vec<Block>,
}

impl Document {
    /// Empty document with no blocks
    pub fn new() -> Self {
        Self::default()
    }

    /// Document for a freshly opened article: one empty paragraph
    pub fn placeholder() -> Self {
        Self::from_blocks(vec![Block::paragraph("")])
    }

    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        Self { version: 0, blocks }
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    fn check_index(&self, index: usize) -> Result<(), DocumentError> {
        if index < self.blocks.len() {
            Ok(())
        } else {
            Err(DocumentError::OutOfRange {
                index,
                len: self.blocks.len(),
            })
        }
    }

    /// Insert at `index`, clamped to `[0, len]`
    pub fn insert_block(&mut self, index: usize, block: Block) {
        let index = index.min(self.blocks.len());
        self.blocks.insert(index, block);
    }

    pub fn remove_block(&mut self, index: usize) -> Result<Block, DocumentError> {
        self.check_index(index)?;
        Ok(self.blocks.remove(index))
    }

    /// Merge `patch` key-by-key into the block's payload, keeping its type.
    ///
    /// The block is left untouched if the merged payload no longer fits
    /// the block's schema.
    pub fn update_block_data(
        &mut self,
        index: usize,
        patch: &Map<String, Value>,
    ) -> Result<(), DocumentError> {
        self.check_index(index)?;
        let block = &self.blocks[index];

        let invalid = |reason: String| DocumentError::InvalidPatch { index, reason };

        let mut data = block.data_value().map_err(|e| invalid(e.to_string()))?;
        match &mut data {
            Value::Object(fields) => {
                for (key, value) in patch {
                    fields.insert(key.clone(), value.clone());
                }
            }
            _ => data = Value::Object(patch.clone()),
        }

        let updated = Block::from_tagged(block.tag(), data).map_err(|e| invalid(e.to_string()))?;
        self.blocks[index] = updated;
        Ok(())
    }

    /// Move the block at `from` so that it ends up at index `to`
    pub fn move_block(&mut self, from: usize, to: usize) -> Result<(), DocumentError> {
        self.check_index(from)?;
        self.check_index(to)?;
        if from != to {
            let block = self.blocks.remove(from);
            self.blocks.insert(to, block);
        }
        Ok(())
    }

    /// Toggle an inline mark over the whole rich text of a block.
    ///
    /// For lists the mark is removed when every item carries it, otherwise
    /// it is added to the items that lack it.
    pub fn toggle_mark(&mut self, index: usize, mark: &InlineMark) -> Result<(), DocumentError> {
        self.check_index(index)?;

        match &mut self.blocks[index] {
            Block::Heading(HeadingData { text, .. })
            | Block::Paragraph(ParagraphData { text })
            | Block::Quote(QuoteData { text, .. }) => {
                *text = mark.toggle(text);
                Ok(())
            }
            Block::List(ListData { items, .. }) => {
                let all_marked = !items.is_empty() && items.iter().all(|i| mark.is_applied(i));
                for item in items.iter_mut() {
                    *item = if all_marked {
                        mark.remove(item)
                    } else {
                        mark.apply(item)
                    };
                }
                Ok(())
            }
            other => Err(DocumentError::NotRichText {
                index,
                tag: other.tag().to_string(),
            }),
        }
    }

    /// Turn a text-bearing block into another text-bearing kind, keeping its text
    pub fn convert_block(&mut self, index: usize, target: BlockKind) -> Result<(), DocumentError> {
        self.check_index(index)?;
        let block = &self.blocks[index];

        let unsupported = || DocumentError::UnsupportedConversion {
            from: block.tag().to_string(),
            to: target.tag().to_string(),
        };

        if block.kind() == Some(target) {
            return Ok(());
        }
        if !target.is_text_bearing() {
            return Err(unsupported());
        }

        let (text, level, caption) = match block {
            Block::Heading(d) => (d.text.clone(), d.level, None),
            Block::Paragraph(d) => (d.text.clone(), DEFAULT_HEADING_LEVEL, None),
            Block::Quote(d) => (d.text.clone(), DEFAULT_HEADING_LEVEL, d.caption.clone()),
            Block::Code(d) => (d.code.clone(), DEFAULT_HEADING_LEVEL, None),
            Block::List(d) => (d.items.join(LINE_BREAK), DEFAULT_HEADING_LEVEL, None),
            _ => return Err(unsupported()),
        };

        let converted = match target {
            BlockKind::Heading => Block::Heading(HeadingData { level, text }),
            BlockKind::Paragraph => Block::paragraph(text),
            BlockKind::Quote => Block::Quote(QuoteData { text, caption }),
            BlockKind::Code => Block::Code(CodeData { code: text }),
            BlockKind::List => Block::List(ListData {
                style: Default::default(),
                items: text
                    .split(LINE_BREAK)
                    .filter(|line| !line.trim().is_empty())
                    .map(str::to_string)
                    .collect(),
            }),
            _ => return Err(unsupported()),
        };

        self.blocks[index] = converted;
        Ok(())
    }

    /// Detached, read-only snapshot of the current blocks
    pub fn to_sequence(&self) -> BlockSequence {
        BlockSequence {
            blocks: Arc::from(self.blocks.as_slice()),
        }
    }

    /// Apply a mutation and bump the version
    pub fn apply(&mut self, mutation: Mutation) -> Result<MutationResult, DocumentError> {
        mutation.apply(self)?;
        self.version += 1;

        tracing::debug!(version = self.version, blocks = self.blocks.len(), "applied {}", mutation.name());

        Ok(MutationResult {
            version: self.version,
        })
    }
}

const LINE_BREAK: &str = "<br>";

impl AsRef<[Block]> for Document {
    fn as_ref(&self) -> &[Block] {
        &self.blocks
    }
}

impl FromIterator<Block> for Document {
    fn from_iter<I: IntoIterator<Item = Block>>(iter: I) -> Self {
        Self::from_blocks(iter.into_iter().collect())
    }
}

/// Immutable snapshot of a document's blocks.
///
/// Cheap to clone and safe to hand to readers on other threads; iterating
/// it again always yields the same blocks in the same order.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockSequence {
    blocks: Arc<[Block]>,
}

impl BlockSequence {
    pub fn iter(&self) -> std::slice::Iter<'_, Block> {
        self.blocks.iter()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    /// Fresh editable document holding copies of these blocks
    pub fn to_document(&self) -> Document {
        Document::from_blocks(self.blocks.to_vec())
    }
}

impl AsRef<[Block]> for BlockSequence {
    fn as_ref(&self) -> &[Block] {
        &self.blocks
    }
}

impl<'a> IntoIterator for &'a BlockSequence {
    type Item = &'a Block;
    type IntoIter = std::slice::Iter<'a, Block>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ListStyle;
    use serde_json::json;

    fn sample() -> Document {
        Document::from_blocks(vec![
            Block::heading(1, "Title"),
            Block::paragraph("First"),
            Block::paragraph("Second"),
        ])
    }

    fn texts(doc: &Document) -> Vec<String> {
        doc.blocks()
            .iter()
            .map(|b| match b {
                Block::Heading(d) => d.text.clone(),
                Block::Paragraph(d) => d.text.clone(),
                other => other.tag().to_string(),
            })
            .collect()
    }

    #[test]
    fn test_placeholder_document() {
        let doc = Document::placeholder();
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.get(0), Some(&Block::paragraph("")));
        assert_eq!(doc.version, 0);
    }

    #[test]
    fn test_insert_clamps_index() {
        let mut doc = sample();
        doc.insert_block(99, Block::delimiter());
        assert_eq!(doc.len(), 4);
        assert_eq!(doc.get(3), Some(&Block::delimiter()));

        doc.insert_block(0, Block::paragraph("Lead"));
        assert_eq!(texts(&doc)[0], "Lead");
    }

    #[test]
    fn test_remove_out_of_range() {
        let mut doc = sample();
        assert_eq!(
            doc.remove_block(3),
            Err(DocumentError::OutOfRange { index: 3, len: 3 })
        );

        let removed = doc.remove_block(1).unwrap();
        assert_eq!(removed, Block::paragraph("First"));
        assert_eq!(texts(&doc), vec!["Title", "Second"]);
    }

    #[test]
    fn test_move_block() {
        let mut doc = sample();
        doc.move_block(0, 2).unwrap();
        assert_eq!(texts(&doc), vec!["First", "Second", "Title"]);

        doc.move_block(1, 1).unwrap();
        assert_eq!(texts(&doc), vec!["First", "Second", "Title"]);

        assert!(matches!(
            doc.move_block(0, 5),
            Err(DocumentError::OutOfRange { index: 5, .. })
        ));
    }

    #[test]
    fn test_update_block_data_preserves_type() {
        let mut doc = sample();
        let patch = json!({ "level": 9 }).as_object().cloned().unwrap();
        doc.update_block_data(0, &patch).unwrap();
        assert_eq!(doc.get(0), Some(&Block::heading(6, "Title")));
    }

    #[test]
    fn test_update_block_data_rejects_ill_typed_patch() {
        let mut doc = sample();
        let patch = json!({ "text": ["not", "text"] }).as_object().cloned().unwrap();
        let err = doc.update_block_data(1, &patch).unwrap_err();
        assert!(matches!(err, DocumentError::InvalidPatch { index: 1, .. }));
        assert_eq!(doc.get(1), Some(&Block::paragraph("First")));
    }

    #[test]
    fn test_toggle_mark_on_list() {
        let mut doc = Document::from_blocks(vec![Block::list(
            ListStyle::Unordered,
            vec!["<b>a</b>".to_string(), "b".to_string()],
        )]);

        doc.toggle_mark(0, &InlineMark::Bold).unwrap();
        assert_eq!(
            doc.get(0),
            Some(&Block::list(
                ListStyle::Unordered,
                vec!["<b>a</b>".to_string(), "<b>b</b>".to_string()]
            ))
        );

        doc.toggle_mark(0, &InlineMark::Bold).unwrap();
        assert_eq!(
            doc.get(0),
            Some(&Block::list(
                ListStyle::Unordered,
                vec!["a".to_string(), "b".to_string()]
            ))
        );
    }

    #[test]
    fn test_toggle_mark_rejects_non_text() {
        let mut doc = Document::from_blocks(vec![Block::delimiter()]);
        assert_eq!(
            doc.toggle_mark(0, &InlineMark::Italic),
            Err(DocumentError::NotRichText {
                index: 0,
                tag: "delimiter".to_string()
            })
        );
    }

    #[test]
    fn test_convert_block() {
        let mut doc = Document::from_blocks(vec![Block::paragraph("Intro")]);
        doc.convert_block(0, BlockKind::Heading).unwrap();
        assert_eq!(doc.get(0), Some(&Block::heading(2, "Intro")));

        doc.convert_block(0, BlockKind::List).unwrap();
        assert_eq!(
            doc.get(0),
            Some(&Block::list(ListStyle::Unordered, vec!["Intro".to_string()]))
        );

        assert!(matches!(
            doc.convert_block(0, BlockKind::Image),
            Err(DocumentError::UnsupportedConversion { .. })
        ));
    }

    #[test]
    fn test_sequence_is_detached() {
        let mut doc = sample();
        let snapshot = doc.to_sequence();

        doc.remove_block(0).unwrap();
        doc.insert_block(0, Block::delimiter());

        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot.get(0), Some(&Block::heading(1, "Title")));

        // Restartable: two passes see the same blocks
        let first: Vec<_> = snapshot.iter().collect();
        let second: Vec<_> = snapshot.iter().collect();
        assert_eq!(first, second);
    }
}
