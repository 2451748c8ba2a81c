//! # Scribe Editor
//!
//! Editing session glue between the document model, the codec and the
//! services that store articles and images.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ editor shell: edit events, settings panel   │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: EditSession                         │
//! │  - Apply mutations to the document          │
//! │  - Build save payloads (title, excerpt, …)  │
//! │  - Draft save / publish with validation     │
//! │  - Local draft snapshots                    │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ ArticleBackend / MediaBackend (async)       │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use scribe_editor::{EditSession, InMemoryBackend};
//!
//! let backend = Arc::new(InMemoryBackend::default());
//! let mut session = EditSession::new(backend, MetricsEngine::default());
//!
//! session.apply(Mutation::InsertBlock { index: 0, block: Block::heading(1, "Hello") })?;
//! let article = session.publish().await?;
//! ```

mod article;
mod backend;
mod draft;
mod errors;
mod memory;
mod session;

pub use article::{parse_tags, Article, ArticleSettings, ArticleStatus, SavePayload};
pub use backend::{
    parse_response, ArticleBackend, MediaBackend, MediaUpload, UpstreamFailure, TIMEOUT_STATUS,
};
pub use draft::{draft_key, DraftError, DraftSnapshot, DraftStore, MemoryDraftStore};
pub use errors::EditorError;
pub use memory::InMemoryBackend;
pub use session::{EditSession, DEFAULT_REQUEST_TIMEOUT};
