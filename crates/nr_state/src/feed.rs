use nr_core::{Article, ArticleApi, Result};
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::pagination::{Completion, PageRequest, PagedList};

/// What a feed lists.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FeedQuery {
    #[default]
    Latest,
    Category(String),
    Search(String),
}

impl fmt::Display for FeedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedQuery::Latest => write!(f, "latest"),
            FeedQuery::Category(key) => write!(f, "category '{}'", key),
            FeedQuery::Search(text) => write!(f, "search '{}'", text),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedOutcome {
    Loaded { received: usize, total: usize },
    /// The query changed before the response arrived
    Stale,
    /// Nothing was requested: a request is already out or no pages remain
    Idle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedSnapshot {
    pub query: FeedQuery,
    pub articles: Vec<Article>,
    pub current_page: u32,
    pub has_more: bool,
    pub loading: bool,
    pub last_error: Option<String>,
}

/// Infinite article list driven against the service.
pub struct ArticleFeed {
    api: Arc<dyn ArticleApi>,
    page_size: u32,
    list: Mutex<PagedList<Article, FeedQuery>>,
}

impl ArticleFeed {
    pub fn new(api: Arc<dyn ArticleApi>, page_size: u32, query: FeedQuery) -> Self {
        Self {
            api,
            page_size,
            list: Mutex::new(PagedList::new(query)),
        }
    }

    /// Returns true when the query changed and results were dropped.
    pub async fn set_query(&self, query: FeedQuery) -> bool {
        self.list.lock().await.set_query(query)
    }

    pub async fn query(&self) -> FeedQuery {
        self.list.lock().await.query().clone()
    }

    /// Reload from page 1.
    pub async fn refresh(&self) -> Result<FeedOutcome> {
        let request = self.list.lock().await.begin_refresh();
        self.run(request).await
    }

    pub async fn load_more(&self) -> Result<FeedOutcome> {
        let request = self.list.lock().await.begin_next();
        self.run(request).await
    }

    pub async fn clear(&self) {
        self.list.lock().await.reset();
    }

    pub async fn snapshot(&self) -> FeedSnapshot {
        let list = self.list.lock().await;
        FeedSnapshot {
            query: list.query().clone(),
            articles: list.items().to_vec(),
            current_page: list.current_page(),
            has_more: list.has_more(),
            loading: list.is_loading(),
            last_error: list.last_error().map(str::to_string),
        }
    }

    async fn run(&self, request: Option<PageRequest<FeedQuery>>) -> Result<FeedOutcome> {
        let Some(request) = request else {
            debug!("Feed busy or exhausted, nothing to load");
            return Ok(FeedOutcome::Idle);
        };

        // The list lock is not held here so a query change can supersede us
        let result = self.fetch(&request).await;

        let mut list = self.list.lock().await;
        match list.complete(&request, result)? {
            Completion::Applied { received } => {
                info!("📰 Loaded {} articles for {} (page {})", received, request.query, request.page);
                Ok(FeedOutcome::Loaded {
                    received,
                    total: list.items().len(),
                })
            }
            Completion::Stale => Ok(FeedOutcome::Stale),
        }
    }

    async fn fetch(&self, request: &PageRequest<FeedQuery>) -> Result<(Vec<Article>, nr_core::Pagination)> {
        let page = match &request.query {
            FeedQuery::Latest => self.api.list_articles(request.page, self.page_size).await?,
            FeedQuery::Category(key) => {
                self.api
                    .articles_by_category(key, request.page, self.page_size)
                    .await?
            }
            FeedQuery::Search(text) => {
                self.api
                    .search_articles(text, request.page, self.page_size)
                    .await?
            }
        };
        Ok((page.articles, page.pagination))
    }
}
