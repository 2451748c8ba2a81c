//! In-process backend with the articles API's validation rules, used by
//! tests and offline editing.

use crate::article::{Article, SavePayload};
use crate::backend::{ArticleBackend, MediaBackend, MediaUpload, UpstreamFailure};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::Mutex;
use tracing::debug;

const MAX_TITLE_CHARS: usize = 255;
const MAX_AUTHOR_CHARS: usize = 100;

#[derive(Debug, Default)]
struct State {
    articles: BTreeMap<i64, Article>,
    next_id: i64,
    uploads: Vec<(i64, String, usize)>,
    fail_next: Option<UpstreamFailure>,
}

#[derive(Debug)]
pub struct InMemoryBackend {
    media_base_url: String,
    state: Mutex<State>,
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new("memory://media")
    }
}

impl InMemoryBackend {
    pub fn new(media_base_url: impl Into<String>) -> Self {
        Self {
            media_base_url: media_base_url.into(),
            state: Mutex::new(State::default()),
        }
    }

    /// Make the next request fail with `failure`
    pub async fn fail_next(&self, failure: UpstreamFailure) {
        self.state.lock().await.fail_next = Some(failure);
    }

    pub async fn article(&self, id: i64) -> Option<Article> {
        self.state.lock().await.articles.get(&id).cloned()
    }

    pub async fn article_count(&self) -> usize {
        self.state.lock().await.articles.len()
    }

    /// `(article_id, filename, byte_len)` for every accepted upload
    pub async fn uploads(&self) -> Vec<(i64, String, usize)> {
        self.state.lock().await.uploads.clone()
    }
}

fn check_payload(payload: &SavePayload) -> Result<(), UpstreamFailure> {
    if payload.title.trim().is_empty() || payload.author_name.trim().is_empty() {
        return Err(UpstreamFailure::new(400, "Title and author_name are required"));
    }
    if payload.title.chars().count() > MAX_TITLE_CHARS {
        return Err(UpstreamFailure::new(400, "Title must be 255 characters or less"));
    }
    if payload.author_name.chars().count() > MAX_AUTHOR_CHARS {
        return Err(UpstreamFailure::new(400, "Author name must be 100 characters or less"));
    }
    Ok(())
}

fn write_payload(article: &mut Article, payload: &SavePayload) -> Result<(), UpstreamFailure> {
    article.title = payload.title.trim().to_string();
    article.author_name = payload.author_name.trim().to_string();
    article.content = serde_json::to_value(&payload.content)
        .map_err(|e| UpstreamFailure::new(500, e.to_string()))?;
    article.status = payload.status;
    article.excerpt = Some(payload.excerpt.clone());
    article.tags = payload.tags.clone();
    article.reading_time = payload.reading_time;
    article.featured_image_url = payload.featured_image_url.clone();
    article.updated_at = Utc::now();
    Ok(())
}

fn not_found() -> UpstreamFailure {
    UpstreamFailure::new(404, "Article not found")
}

#[async_trait]
impl ArticleBackend for InMemoryBackend {
    async fn create(&self, payload: &SavePayload) -> Result<Article, UpstreamFailure> {
        let mut state = self.state.lock().await;
        if let Some(failure) = state.fail_next.take() {
            return Err(failure);
        }
        check_payload(payload)?;

        state.next_id += 1;
        let now = Utc::now();
        let mut article = Article {
            id: state.next_id,
            title: String::new(),
            author_name: String::new(),
            content: serde_json::Value::Null,
            status: payload.status,
            excerpt: None,
            tags: Default::default(),
            reading_time: 0,
            featured_image_url: None,
            created_at: now,
            updated_at: now,
        };
        write_payload(&mut article, payload)?;

        debug!(id = article.id, "created article");
        state.articles.insert(article.id, article.clone());
        Ok(article)
    }

    async fn update(&self, id: i64, payload: &SavePayload) -> Result<Article, UpstreamFailure> {
        let mut state = self.state.lock().await;
        if let Some(failure) = state.fail_next.take() {
            return Err(failure);
        }

        let article = state.articles.get_mut(&id).ok_or_else(not_found)?;
        check_payload(payload)?;
        write_payload(article, payload)?;

        debug!(id, "updated article");
        Ok(article.clone())
    }

    async fn fetch(&self, id: i64) -> Result<Article, UpstreamFailure> {
        let mut state = self.state.lock().await;
        if let Some(failure) = state.fail_next.take() {
            return Err(failure);
        }
        state.articles.get(&id).cloned().ok_or_else(not_found)
    }
}

#[async_trait]
impl MediaBackend for InMemoryBackend {
    async fn upload_image(
        &self,
        article_id: i64,
        bytes: Vec<u8>,
        filename: &str,
    ) -> Result<MediaUpload, UpstreamFailure> {
        let mut state = self.state.lock().await;
        if let Some(failure) = state.fail_next.take() {
            return Err(failure);
        }
        if !state.articles.contains_key(&article_id) {
            return Err(not_found());
        }
        if bytes.is_empty() {
            return Err(UpstreamFailure::new(400, "No image file provided"));
        }

        state
            .uploads
            .push((article_id, filename.to_string(), bytes.len()));
        let url = format!(
            "{}/articles/{}/{}-{}",
            self.media_base_url.trim_end_matches('/'),
            article_id,
            state.uploads.len(),
            filename
        );

        Ok(MediaUpload {
            url,
            alt: None,
            caption: None,
        })
    }
}
