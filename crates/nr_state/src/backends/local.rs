use async_trait::async_trait;
use nr_core::{Article, ArticleId, BookmarkBackend, CommitMode, KeyValueStore, Result};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::warn;

pub const BOOKMARKS_KEY: &str = "newsreader/bookmarks";

#[derive(Serialize)]
struct StoredBookmarks<'a> {
    bookmarks: &'a [Article],
}

/// Bookmarks kept on this device under a single key.
pub struct LocalBookmarks {
    store: Arc<dyn KeyValueStore>,
    write_lock: Mutex<()>,
}

impl LocalBookmarks {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    async fn read(&self) -> Result<Vec<Article>> {
        let Some(raw) = self.store.get(BOOKMARKS_KEY).await? else {
            return Ok(Vec::new());
        };
        Ok(parse_bookmarks(&raw))
    }

    async fn write(&self, articles: &[Article]) -> Result<()> {
        let raw = serde_json::to_string(&StoredBookmarks { bookmarks: articles })?;
        self.store.set(BOOKMARKS_KEY, &raw).await
    }
}

/// Unreadable documents and entries are skipped rather than failing the
/// whole collection.
fn parse_bookmarks(raw: &str) -> Vec<Article> {
    let document: Value = match serde_json::from_str(raw) {
        Ok(document) => document,
        Err(e) => {
            warn!("Stored bookmarks are not valid JSON, starting empty: {}", e);
            return Vec::new();
        }
    };
    let Some(entries) = document.get("bookmarks").and_then(Value::as_array) else {
        warn!("Stored bookmarks have no bookmark list, starting empty");
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| match serde_json::from_value::<Article>(entry.clone()) {
            Ok(article) => Some(article),
            Err(e) => {
                warn!("Skipping unreadable stored bookmark: {}", e);
                None
            }
        })
        .collect()
}

#[async_trait]
impl BookmarkBackend for LocalBookmarks {
    fn name(&self) -> &'static str {
        "local"
    }

    fn commit_mode(&self) -> CommitMode {
        CommitMode::Confirmed
    }

    async fn load(&self) -> Result<Vec<Article>> {
        self.read().await
    }

    async fn add(&self, article: &Article) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut articles = self.read().await?;
        if articles.iter().any(|a| a.id == article.id) {
            return Ok(());
        }
        articles.insert(0, article.clone());
        self.write(&articles).await
    }

    async fn remove(&self, id: &ArticleId) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut articles = self.read().await?;
        let before = articles.len();
        articles.retain(|a| &a.id != id);
        if articles.len() == before {
            return Ok(());
        }
        self.write(&articles).await
    }
}
