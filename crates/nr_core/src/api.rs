use async_trait::async_trait;
use crate::types::{Article, ArticleId, ArticlePage, NewsSource};
use crate::Result;

/// The remote article service.
#[async_trait]
pub trait ArticleApi: Send + Sync {
    /// Latest articles, newest first
    async fn list_articles(&self, page: u32, limit: u32) -> Result<ArticlePage>;

    /// Full-text search
    async fn search_articles(&self, query: &str, page: u32, limit: u32) -> Result<ArticlePage>;

    /// Articles filed under a category key
    async fn articles_by_category(&self, category: &str, page: u32, limit: u32) -> Result<ArticlePage>;

    async fn get_article(&self, id: &ArticleId) -> Result<Article>;

    async fn list_sources(&self) -> Result<Vec<NewsSource>>;

    /// Bookmarks for the current token or client identifier
    async fn list_bookmarks(&self) -> Result<Vec<Article>>;

    /// Only success or failure is meaningful; the response body is ignored
    async fn add_bookmark(&self, id: &ArticleId) -> Result<()>;

    async fn remove_bookmark(&self, id: &ArticleId) -> Result<()>;
}
