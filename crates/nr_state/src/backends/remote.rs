use async_trait::async_trait;
use nr_core::{Article, ArticleApi, ArticleId, BookmarkBackend, CommitMode, Result};
use std::sync::Arc;

/// Bookmarks held by the article service for the current caller.
pub struct RemoteBookmarks {
    api: Arc<dyn ArticleApi>,
}

impl RemoteBookmarks {
    pub fn new(api: Arc<dyn ArticleApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl BookmarkBackend for RemoteBookmarks {
    fn name(&self) -> &'static str {
        "remote"
    }

    fn commit_mode(&self) -> CommitMode {
        CommitMode::Optimistic
    }

    async fn load(&self) -> Result<Vec<Article>> {
        self.api.list_bookmarks().await
    }

    async fn add(&self, article: &Article) -> Result<()> {
        self.api.add_bookmark(&article.id).await
    }

    async fn remove(&self, id: &ArticleId) -> Result<()> {
        self.api.remove_bookmark(id).await
    }
}
