//! Scripted collaborators for unit tests.

use async_trait::async_trait;
use nr_core::{
    Article, ArticleApi, ArticleId, ArticlePage, BookmarkBackend, CommitMode, Error, NewsSource,
    Pagination, Result,
};
use std::sync::Arc;
use tokio::sync::{Mutex, Notify};

pub fn id(raw: &str) -> ArticleId {
    ArticleId::parse(raw).unwrap()
}

pub fn article(raw: &str) -> Article {
    Article::new(id(raw), format!("Article {}", raw))
}

/// Failure injection and a one-shot gate shared by the fakes below.
#[derive(Default)]
struct Script {
    fail: Mutex<Option<Error>>,
    gate: Mutex<Option<Arc<Notify>>>,
    calls: Mutex<Vec<String>>,
}

impl Script {
    async fn step(&self, call: String) -> Result<()> {
        self.calls.lock().await.push(call);
        let gate = self.gate.lock().await.take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        match self.fail.lock().await.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn hold_next(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock().await = Some(gate.clone());
        gate
    }
}

pub struct ScriptedBackend {
    mode: CommitMode,
    articles: Mutex<Vec<Article>>,
    script: Script,
}

impl ScriptedBackend {
    pub fn new(mode: CommitMode) -> Self {
        Self {
            mode,
            articles: Mutex::new(Vec::new()),
            script: Script::default(),
        }
    }

    pub async fn seed(&self, articles: Vec<Article>) {
        *self.articles.lock().await = articles;
    }

    pub async fn fail_next(&self, error: Error) {
        *self.script.fail.lock().await = Some(error);
    }

    /// The next backend call blocks until the returned gate is notified.
    pub async fn hold_next(&self) -> Arc<Notify> {
        self.script.hold_next().await
    }

    pub async fn calls(&self) -> usize {
        self.script.calls.lock().await.len()
    }
}

#[async_trait]
impl BookmarkBackend for ScriptedBackend {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn commit_mode(&self) -> CommitMode {
        self.mode
    }

    async fn load(&self) -> Result<Vec<Article>> {
        self.script.step("load".into()).await?;
        Ok(self.articles.lock().await.clone())
    }

    async fn add(&self, article: &Article) -> Result<()> {
        self.script.step(format!("add {}", article.id)).await?;
        self.articles.lock().await.insert(0, article.clone());
        Ok(())
    }

    async fn remove(&self, id: &ArticleId) -> Result<()> {
        self.script.step(format!("remove {}", id)).await?;
        self.articles.lock().await.retain(|a| &a.id != id);
        Ok(())
    }
}

/// Article service answering every listing with `per_page` generated
/// articles named `{query}-{page}-{n}`.
pub struct FakeApi {
    pages: u32,
    per_page: usize,
    bookmarks: Mutex<Vec<Article>>,
    script: Script,
}

impl FakeApi {
    pub fn new(pages: u32, per_page: usize) -> Self {
        Self {
            pages,
            per_page,
            bookmarks: Mutex::new(Vec::new()),
            script: Script::default(),
        }
    }

    pub async fn fail_next(&self, error: Error) {
        *self.script.fail.lock().await = Some(error);
    }

    pub async fn hold_next(&self) -> Arc<Notify> {
        self.script.hold_next().await
    }

    pub async fn calls(&self) -> Vec<String> {
        self.script.calls.lock().await.clone()
    }

    fn page(&self, prefix: &str, page: u32) -> ArticlePage {
        let articles = (0..self.per_page)
            .map(|n| article(&format!("{}-{}-{}", prefix, page, n)))
            .collect();
        ArticlePage {
            articles,
            pagination: Pagination {
                page,
                pages: self.pages,
                total: None,
                limit: None,
            },
        }
    }
}

#[async_trait]
impl ArticleApi for FakeApi {
    async fn list_articles(&self, page: u32, _limit: u32) -> Result<ArticlePage> {
        self.script.step(format!("latest {}", page)).await?;
        Ok(self.page("latest", page))
    }

    async fn search_articles(&self, query: &str, page: u32, _limit: u32) -> Result<ArticlePage> {
        self.script.step(format!("search {} {}", query, page)).await?;
        Ok(self.page(query, page))
    }

    async fn articles_by_category(&self, category: &str, page: u32, _limit: u32) -> Result<ArticlePage> {
        self.script.step(format!("category {} {}", category, page)).await?;
        Ok(self.page(category, page))
    }

    async fn get_article(&self, id: &ArticleId) -> Result<Article> {
        self.script.step(format!("get {}", id)).await?;
        if id.as_str() == "missing" {
            return Err(Error::Server {
                status: 404,
                message: "Article not found".into(),
            });
        }
        let mut detail = Article::new(id.clone(), "Detail");
        detail.content = Some("<p>Body</p>".into());
        Ok(detail)
    }

    async fn list_sources(&self) -> Result<Vec<NewsSource>> {
        self.script.step("sources".into()).await?;
        Ok(vec![NewsSource {
            id: Some("s1".into()),
            name: "Wire".into(),
            url: None,
            category: None,
            description: None,
        }])
    }

    async fn list_bookmarks(&self) -> Result<Vec<Article>> {
        self.script.step("bookmarks".into()).await?;
        Ok(self.bookmarks.lock().await.clone())
    }

    async fn add_bookmark(&self, id: &ArticleId) -> Result<()> {
        self.script.step(format!("bookmark {}", id)).await?;
        self.bookmarks.lock().await.insert(0, article(id.as_str()));
        Ok(())
    }

    async fn remove_bookmark(&self, id: &ArticleId) -> Result<()> {
        self.script.step(format!("unbookmark {}", id)).await?;
        self.bookmarks.lock().await.retain(|a| &a.id != id);
        Ok(())
    }
}
