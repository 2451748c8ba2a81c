//! # Edit Session
//!
//! One author editing one article. The session owns the document, applies
//! edit mutations to it, and turns it into save payloads for the
//! persistence collaborator.
//!
//! Saves are last-write-wins: the session neither retries nor cancels a
//! request, it only bounds how long it waits for one.

use crate::article::{ArticleSettings, ArticleStatus, SavePayload};
use crate::backend::{ArticleBackend, MediaBackend, UpstreamFailure};
use crate::draft::{draft_key, DraftSnapshot, DraftStore};
use crate::{Article, EditorError};
use chrono::Utc;
use scribe_codec::{
    encode, validate_for_draft, validate_for_publish, CodecWarning, Metrics, MetricsEngine,
};
use scribe_document::{Block, Document, Mutation, MutationResult};
use serde_json::{json, Map};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// How long a collaborator call may take before it counts as failed
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct EditSession {
    backend: Arc<dyn ArticleBackend>,
    engine: MetricsEngine,
    article_id: Option<i64>,
    document: Document,
    /// Settings panel values used for the next save
    pub settings: ArticleSettings,
    saved_version: Option<u64>,
    request_timeout: Duration,
    drafts: Option<Arc<dyn DraftStore>>,
}

impl EditSession {
    /// Session for a brand new article, starting from one empty paragraph
    pub fn new(backend: Arc<dyn ArticleBackend>, engine: MetricsEngine) -> Self {
        Self {
            backend,
            engine,
            article_id: None,
            document: Document::placeholder(),
            settings: ArticleSettings::default(),
            saved_version: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            drafts: None,
        }
    }

    /// Load an existing article for editing.
    ///
    /// Returns the warnings for any stored blocks that could not be decoded.
    #[instrument(skip(backend, engine))]
    pub async fn open(
        backend: Arc<dyn ArticleBackend>,
        engine: MetricsEngine,
        id: i64,
    ) -> Result<(Self, Vec<CodecWarning>), EditorError> {
        let mut session = Self::new(backend, engine);
        let article = session.call(session.backend.fetch(id)).await?;
        let decoded = article.decode()?;

        for warning in &decoded.warnings {
            warn!(%warning, "stored content was not fully recovered");
        }
        if decoded.shape.is_legacy() {
            info!(id, shape = ?decoded.shape, "opened article stored in a legacy format");
        }

        session.article_id = Some(article.id);
        session.document = decoded.document;
        session.settings = ArticleSettings::from_article(&article);
        session.saved_version = Some(session.document.version);
        Ok((session, decoded.warnings))
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Local draft store kept in step with saves. The draft of a new
    /// article is removed once the backend has created it.
    pub fn with_draft_store(mut self, store: Arc<dyn DraftStore>) -> Self {
        self.drafts = Some(store);
        self
    }

    pub fn article_id(&self) -> Option<i64> {
        self.article_id
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Edits made since the last successful save
    pub fn is_dirty(&self) -> bool {
        self.saved_version != Some(self.document.version)
    }

    pub fn apply(&mut self, mutation: Mutation) -> Result<MutationResult, EditorError> {
        Ok(self.document.apply(mutation)?)
    }

    pub fn metrics(&self) -> Metrics {
        self.engine.measure(&self.document)
    }

    pub fn payload(&self, status: ArticleStatus) -> (SavePayload, Vec<CodecWarning>) {
        SavePayload::build(&self.document, &self.settings, status, &self.engine)
    }

    /// Save as a draft. Empty content is accepted.
    #[instrument(skip(self), fields(article_id = ?self.article_id))]
    pub async fn save_draft(&mut self) -> Result<Article, EditorError> {
        validate_for_draft(&self.document)?;
        self.save(ArticleStatus::Draft).await
    }

    /// Publish. Fails with `EmptyContent` before contacting the backend when
    /// no block has visible text.
    #[instrument(skip(self), fields(article_id = ?self.article_id))]
    pub async fn publish(&mut self) -> Result<Article, EditorError> {
        validate_for_publish(&self.document)?;
        self.save(ArticleStatus::Published).await
    }

    async fn save(&mut self, status: ArticleStatus) -> Result<Article, EditorError> {
        let (payload, warnings) = self.payload(status);
        for warning in &warnings {
            warn!(%warning, "block left out of save");
        }

        let version = self.document.version;
        let article = match self.article_id {
            Some(id) => self.call(self.backend.update(id, &payload)).await?,
            None => self.call(self.backend.create(&payload)).await?,
        };

        info!(
            id = article.id,
            status = ?article.status,
            blocks = payload.content.blocks.len(),
            "article saved"
        );
        if self.article_id.is_none() {
            self.forget_new_draft();
        }
        self.article_id = Some(article.id);
        self.saved_version = Some(version);
        Ok(article)
    }

    // The save already succeeded, so a store failure is only logged.
    fn forget_new_draft(&self) {
        let Some(store) = &self.drafts else { return };
        if let Err(error) = store.remove(&draft_key(None)) {
            warn!(%error, "could not remove the local draft of the new article");
        }
    }

    /// Upload an image for the image block at `index` and write the returned
    /// URL into it. An article that was never saved is saved as a draft
    /// first so the upload has an article to belong to.
    #[instrument(skip(self, media, bytes), fields(len = bytes.len()))]
    pub async fn upload_image(
        &mut self,
        media: &dyn MediaBackend,
        index: usize,
        bytes: Vec<u8>,
        filename: &str,
    ) -> Result<MutationResult, EditorError> {
        match self.document.get(index) {
            Some(Block::Image(_)) => {}
            Some(_) => return Err(EditorError::NotAnImage { index }),
            None => {
                return Err(scribe_document::DocumentError::OutOfRange {
                    index,
                    len: self.document.len(),
                }
                .into())
            }
        }

        let article_id = match self.article_id {
            Some(id) => id,
            None => {
                debug!("saving draft so the upload has an article");
                self.save_draft().await?.id
            }
        };

        let upload = self
            .call(media.upload_image(article_id, bytes, filename))
            .await?;
        self.resolve_image(index, &upload.url)
    }

    /// Point the image block at `index` to an uploaded URL
    pub fn resolve_image(&mut self, index: usize, url: &str) -> Result<MutationResult, EditorError> {
        if !matches!(self.document.get(index), Some(Block::Image(_)) | None) {
            return Err(EditorError::NotAnImage { index });
        }

        let mut patch = Map::new();
        patch.insert("url".to_string(), json!(url));
        patch.insert("file".to_string(), json!(null));
        self.apply(Mutation::UpdateBlockData { index, patch })
    }

    /// Write the current content to the local draft store
    pub fn snapshot_draft(&self, store: &dyn DraftStore) -> Result<DraftSnapshot, EditorError> {
        let snapshot = DraftSnapshot {
            content: encode(&self.document),
            metrics: self.metrics(),
            saved_at: Utc::now(),
        };
        store.set(&draft_key(self.article_id), snapshot.to_json()?)?;
        Ok(snapshot)
    }

    /// Replace the document with the stored local draft, if there is one
    pub fn restore_draft(&mut self, store: &dyn DraftStore) -> Result<Option<DraftSnapshot>, EditorError> {
        let Some(json) = store.get(&draft_key(self.article_id))? else {
            return Ok(None);
        };

        let snapshot = DraftSnapshot::from_json(&json)?;
        let mut document = Document::from_blocks(snapshot.content.blocks.clone());
        // Keep counting from the current version so a restore reads as an edit
        document.version = self.document.version + 1;
        self.document = document;

        debug!(saved_at = %snapshot.saved_at, "restored local draft");
        Ok(Some(snapshot))
    }

    pub fn discard_draft(&self, store: &dyn DraftStore) -> Result<(), EditorError> {
        Ok(store.remove(&draft_key(self.article_id))?)
    }

    async fn call<T>(
        &self,
        request: impl Future<Output = Result<T, UpstreamFailure>>,
    ) -> Result<T, UpstreamFailure> {
        match tokio::time::timeout(self.request_timeout, request).await {
            Ok(result) => result,
            Err(_) => Err(UpstreamFailure::timed_out()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryBackend;
    use scribe_document::ImageData;

    fn session() -> (Arc<InMemoryBackend>, EditSession) {
        let backend = Arc::new(InMemoryBackend::default());
        let session = EditSession::new(backend.clone(), MetricsEngine::default());
        (backend, session)
    }

    #[tokio::test]
    async fn test_new_session_starts_with_placeholder() {
        let (_, session) = session();
        assert_eq!(session.document().blocks(), &[Block::paragraph("")]);
        assert_eq!(session.article_id(), None);
        assert!(session.is_dirty());
    }

    #[tokio::test]
    async fn test_publish_empty_content_never_calls_backend() {
        let (backend, mut session) = session();

        let err = session.publish().await.unwrap_err();
        assert!(err.is_empty_content());
        assert!(!err.is_upstream());
        assert_eq!(backend.article_count().await, 0);

        // Draft saves accept the same content
        let article = session.save_draft().await.unwrap();
        assert_eq!(article.status, ArticleStatus::Draft);
        assert_eq!(article.title, "Untitled Article");
        assert!(!session.is_dirty());
    }

    #[tokio::test]
    async fn test_second_save_updates_same_article() {
        let (backend, mut session) = session();
        session
            .apply(Mutation::InsertBlock {
                index: 0,
                block: Block::heading(1, "Hello"),
            })
            .unwrap();

        let first = session.save_draft().await.unwrap();
        session
            .apply(Mutation::InsertBlock {
                index: 2,
                block: Block::paragraph("More"),
            })
            .unwrap();
        assert!(session.is_dirty());

        let second = session.publish().await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.status, ArticleStatus::Published);
        assert_eq!(backend.article_count().await, 1);
    }

    #[tokio::test]
    async fn test_upstream_failure_is_reported() {
        let (backend, mut session) = session();
        backend.fail_next(UpstreamFailure::new(500, "Failed to create article")).await;

        let err = session.save_draft().await.unwrap_err();
        assert!(err.is_upstream());
        assert!(matches!(
            err,
            EditorError::Upstream(UpstreamFailure { status: 500, .. })
        ));
        assert_eq!(session.article_id(), None);
        assert!(session.is_dirty());
    }

    #[tokio::test]
    async fn test_resolve_image() {
        let (_, mut session) = session();
        session
            .apply(Mutation::InsertBlock {
                index: 1,
                block: Block::Image(ImageData::pending("cat.png")),
            })
            .unwrap();

        session.resolve_image(1, "https://cdn.example/cat.png").unwrap();
        assert_eq!(
            session.document().get(1),
            Some(&Block::image("https://cdn.example/cat.png"))
        );

        let err = session.resolve_image(0, "x").unwrap_err();
        assert!(matches!(err, EditorError::NotAnImage { index: 0 }));
    }
}
