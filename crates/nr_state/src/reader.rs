//! Everything a news-reader front end holds on to between screens.

use nr_core::{Article, ArticleApi, ArticleId, BookmarkBackend, NewsSource, Result};
use nr_storage::SessionStore;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::bookmarks::BookmarkStore;
use crate::feed::{ArticleFeed, FeedOutcome, FeedQuery};
use crate::history::SearchHistory;

pub struct Reader {
    api: Arc<dyn ArticleApi>,
    articles: ArticleFeed,
    results: ArticleFeed,
    bookmarks: BookmarkStore,
    history: RwLock<SearchHistory>,
    sources: RwLock<Vec<NewsSource>>,
    current: RwLock<Option<Article>>,
    session: SessionStore,
}

impl Reader {
    pub fn new(
        api: Arc<dyn ArticleApi>,
        backend: Arc<dyn BookmarkBackend>,
        session: SessionStore,
        page_size: u32,
    ) -> Self {
        Self {
            articles: ArticleFeed::new(api.clone(), page_size, FeedQuery::Latest),
            results: ArticleFeed::new(api.clone(), page_size, FeedQuery::Search(String::new())),
            bookmarks: BookmarkStore::new(backend),
            history: RwLock::new(SearchHistory::default()),
            sources: RwLock::new(Vec::new()),
            current: RwLock::new(None),
            api,
            session,
        }
    }

    /// Loads bookmarks and the first page of the latest articles. A bookmark
    /// failure is kept on the bookmark store and does not stop the feed.
    pub async fn start(&self) -> Result<FeedOutcome> {
        if let Err(e) = self.bookmarks.load().await {
            warn!("Starting without bookmarks: {}", e);
        }
        self.show_latest().await
    }

    pub fn articles(&self) -> &ArticleFeed {
        &self.articles
    }

    pub fn search_results(&self) -> &ArticleFeed {
        &self.results
    }

    pub fn bookmarks(&self) -> &BookmarkStore {
        &self.bookmarks
    }

    pub async fn show_latest(&self) -> Result<FeedOutcome> {
        self.articles.set_query(FeedQuery::Latest).await;
        self.articles.refresh().await
    }

    pub async fn show_category(&self, key: &str) -> Result<FeedOutcome> {
        self.articles.set_query(FeedQuery::Category(key.to_string())).await;
        self.articles.refresh().await
    }

    pub async fn load_more_articles(&self) -> Result<FeedOutcome> {
        self.articles.load_more().await
    }

    /// Runs a new search. Blank queries do nothing.
    pub async fn search(&self, query: &str) -> Result<FeedOutcome> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(FeedOutcome::Idle);
        }
        self.results.set_query(FeedQuery::Search(query.to_string())).await;
        let outcome = self.results.refresh().await?;
        if let FeedOutcome::Loaded { .. } = outcome {
            self.history.write().await.record(query);
        }
        Ok(outcome)
    }

    pub async fn load_more_results(&self) -> Result<FeedOutcome> {
        self.results.load_more().await
    }

    pub async fn clear_search(&self) {
        self.results.set_query(FeedQuery::Search(String::new())).await;
        self.results.clear().await;
    }

    pub async fn search_history(&self) -> Vec<String> {
        self.history.read().await.entries()
    }

    /// Fetches the full article and makes it the current one.
    pub async fn open_article(&self, id: &ArticleId) -> Result<Article> {
        let article = self.api.get_article(id).await?;
        *self.current.write().await = Some(article.clone());
        Ok(article)
    }

    pub async fn set_current_article(&self, article: Option<Article>) {
        *self.current.write().await = article;
    }

    pub async fn current_article(&self) -> Option<Article> {
        self.current.read().await.clone()
    }

    pub async fn load_sources(&self) -> Result<usize> {
        let sources = self.api.list_sources().await?;
        let count = sources.len();
        *self.sources.write().await = sources;
        info!("🗞️ Loaded {} sources", count);
        Ok(count)
    }

    pub async fn sources(&self) -> Vec<NewsSource> {
        self.sources.read().await.clone()
    }

    /// Forgets the stored session and the in-memory bookmarks.
    pub async fn logout(&self) -> Result<()> {
        self.session.clear().await?;
        self.bookmarks.clear().await;
        *self.current.write().await = None;
        info!("👋 Logged out");
        Ok(())
    }
}
