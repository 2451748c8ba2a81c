//! # Scribe Document
//!
//! In-memory document model for article bodies.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ editor shell: edit events                   │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ document: Block sequence + mutations        │
//! │  - Typed, closed set of block payloads      │
//! │  - Index-based structural operations        │
//! │  - Inline mark toggling on rich text        │
//! │  - Detached snapshots for readers           │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ codec: structured form / markup / metrics   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use scribe_document::{Block, Document, Mutation};
//!
//! let mut doc = Document::placeholder();
//! doc.apply(Mutation::InsertBlock {
//!     index: 0,
//!     block: Block::heading(1, "Hello"),
//! })?;
//!
//! let snapshot = doc.to_sequence();
//! assert_eq!(snapshot.len(), 2);
//! # Ok::<(), scribe_document::DocumentError>(())
//! ```

mod block;
mod document;
mod errors;
mod marks;
mod mutations;

pub use block::{
    clamp_heading_level, Block, BlockKind, CodeData, DelimiterData, EmbedData, HeadingData,
    ImageData, ImageFile, ListData, ListStyle, OpaqueBlock, ParagraphData, QuoteData, RawData,
    TaggedBlock, DEFAULT_HEADING_LEVEL, MAX_HEADING_LEVEL, MIN_HEADING_LEVEL,
};
pub use document::{BlockSequence, Document};
pub use errors::{DocumentError, PayloadError};
pub use marks::InlineMark;
pub use mutations::{Mutation, MutationResult};
