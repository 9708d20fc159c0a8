use async_trait::async_trait;
use crate::types::{Article, ArticleId};
use crate::Result;

/// When a bookmark mutation becomes visible in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitMode {
    /// Apply locally first, roll back if the backend refuses.
    Optimistic,
    /// Apply locally only after the backend acknowledges.
    Confirmed,
}

/// Where the bookmark collection is persisted.
#[async_trait]
pub trait BookmarkBackend: Send + Sync {
    fn name(&self) -> &'static str;

    fn commit_mode(&self) -> CommitMode;

    /// Full collection, most recent first
    async fn load(&self) -> Result<Vec<Article>>;

    async fn add(&self, article: &Article) -> Result<()>;

    async fn remove(&self, id: &ArticleId) -> Result<()>;
}
