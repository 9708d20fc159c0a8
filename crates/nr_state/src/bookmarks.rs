//! The bookmark collection and the state machine that keeps it in step with
//! its backend.

use nr_core::{Article, ArticleId, BookmarkBackend, CommitMode, Result};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard, RwLock};
use tracing::{info, warn};

/// Ordered bookmarks plus the set of their identifiers.
///
/// Every mutation touches both halves, so the set is always exactly the ids
/// of the sequence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookmarkCollection {
    articles: Vec<Article>,
    ids: HashSet<ArticleId>,
}

/// An entry taken out of the collection, remembered so it can be put back.
#[derive(Debug, Clone)]
pub struct Removed {
    pub index: usize,
    pub article: Article,
}

impl BookmarkCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a collection keeping the first occurrence of each identifier.
    pub fn from_articles(articles: impl IntoIterator<Item = Article>) -> Self {
        let mut collection = Self::new();
        for article in articles {
            if collection.ids.insert(article.id.clone()) {
                collection.articles.push(article);
            }
        }
        collection
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn ids(&self) -> &HashSet<ArticleId> {
        &self.ids
    }

    pub fn contains(&self, id: &ArticleId) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    /// Most recent first. Returns false if the article was already present.
    pub fn insert_front(&mut self, article: Article) -> bool {
        if !self.ids.insert(article.id.clone()) {
            return false;
        }
        self.articles.insert(0, article);
        true
    }

    pub fn remove(&mut self, id: &ArticleId) -> Option<Removed> {
        if !self.ids.remove(id) {
            return None;
        }
        let index = self.articles.iter().position(|a| &a.id == id)?;
        let article = self.articles.remove(index);
        Some(Removed { index, article })
    }

    /// Put a removed entry back where it was.
    pub fn restore(&mut self, removed: Removed) {
        if !self.ids.insert(removed.article.id.clone()) {
            return;
        }
        let index = removed.index.min(self.articles.len());
        self.articles.insert(index, removed.article);
    }

    pub fn clear(&mut self) {
        self.articles.clear();
        self.ids.clear();
    }

    pub fn is_consistent(&self) -> bool {
        self.ids.len() == self.articles.len() && self.articles.iter().all(|a| self.ids.contains(&a.id))
    }
}

#[derive(Debug, Default)]
struct BookmarkState {
    collection: BookmarkCollection,
    pending: HashSet<ArticleId>,
    loading: bool,
    last_error: Option<String>,
}

/// Point-in-time copy of the store for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct BookmarkSnapshot {
    pub collection: BookmarkCollection,
    /// Ids with a mutation still awaiting the backend
    pub pending: HashSet<ArticleId>,
    pub loading: bool,
    pub last_error: Option<String>,
}

/// Owns the bookmark collection for one backend.
///
/// Mutations are serialized: each holds an operation lock until its backend
/// call settles, so a `remove` issued after an `add` observes the finished
/// `add`. Readers are never blocked by that lock and may see tentative state
/// (marked as pending) from an optimistic backend.
pub struct BookmarkStore {
    backend: Arc<dyn BookmarkBackend>,
    state: RwLock<BookmarkState>,
    ops: Mutex<()>,
}

impl BookmarkStore {
    pub fn new(backend: Arc<dyn BookmarkBackend>) -> Self {
        Self {
            backend,
            state: RwLock::new(BookmarkState::default()),
            ops: Mutex::new(()),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Replace the collection with the backend's. On failure the previous
    /// collection stays and the error is kept as `last_error`.
    pub async fn load(&self) -> Result<usize> {
        let _op = self.ops.lock().await;
        self.state.write().await.loading = true;

        let result = self.backend.load().await;

        let mut state = self.state.write().await;
        state.loading = false;
        match result {
            Ok(articles) => {
                state.collection = BookmarkCollection::from_articles(articles);
                state.last_error = None;
                info!("🔖 Loaded {} bookmarks from {}", state.collection.len(), self.backend.name());
                Ok(state.collection.len())
            }
            Err(e) => {
                warn!("Failed to load bookmarks from {}: {}", self.backend.name(), e);
                state.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Returns false when the article was already bookmarked.
    pub async fn add(&self, article: Article) -> Result<bool> {
        let op = self.ops.lock().await;
        self.add_locked(&op, article).await
    }

    /// Returns false when the id was not bookmarked.
    pub async fn remove(&self, id: &ArticleId) -> Result<bool> {
        let op = self.ops.lock().await;
        self.remove_locked(&op, id).await
    }

    /// Flip the bookmark state of an article; returns the new state.
    pub async fn toggle(&self, article: Article) -> Result<bool> {
        let op = self.ops.lock().await;
        if self.state.read().await.collection.contains(&article.id) {
            self.remove_locked(&op, &article.id).await?;
            Ok(false)
        } else {
            self.add_locked(&op, article).await?;
            Ok(true)
        }
    }

    /// Forget everything in memory. The backend is not touched.
    pub async fn clear(&self) {
        let _op = self.ops.lock().await;
        *self.state.write().await = BookmarkState::default();
    }

    async fn add_locked(&self, _op: &MutexGuard<'_, ()>, article: Article) -> Result<bool> {
        let id = article.id.clone();
        let optimistic = self.backend.commit_mode() == CommitMode::Optimistic;
        {
            let mut state = self.state.write().await;
            if state.collection.contains(&id) {
                return Ok(false);
            }
            if optimistic {
                state.collection.insert_front(article.clone());
            }
            state.pending.insert(id.clone());
        }

        let result = self.backend.add(&article).await;

        let mut state = self.state.write().await;
        state.pending.remove(&id);
        match result {
            Ok(()) => {
                if !optimistic {
                    state.collection.insert_front(article);
                }
                state.last_error = None;
                info!("🔖 Bookmarked {}", id);
                Ok(true)
            }
            Err(e) => {
                if optimistic {
                    state.collection.remove(&id);
                }
                state.last_error = Some(e.to_string());
                warn!("Failed to bookmark {}: {}", id, e);
                Err(e)
            }
        }
    }

    async fn remove_locked(&self, _op: &MutexGuard<'_, ()>, id: &ArticleId) -> Result<bool> {
        let optimistic = self.backend.commit_mode() == CommitMode::Optimistic;
        let removed = {
            let mut state = self.state.write().await;
            if !state.collection.contains(id) {
                return Ok(false);
            }
            state.pending.insert(id.clone());
            if optimistic {
                state.collection.remove(id)
            } else {
                None
            }
        };

        let result = self.backend.remove(id).await;

        let mut state = self.state.write().await;
        state.pending.remove(id);
        match result {
            Ok(()) => {
                if !optimistic {
                    state.collection.remove(id);
                }
                state.last_error = None;
                info!("🗑️ Removed bookmark {}", id);
                Ok(true)
            }
            Err(e) => {
                if let Some(removed) = removed {
                    state.collection.restore(removed);
                }
                state.last_error = Some(e.to_string());
                warn!("Failed to remove bookmark {}: {}", id, e);
                Err(e)
            }
        }
    }

    pub async fn snapshot(&self) -> BookmarkSnapshot {
        let state = self.state.read().await;
        BookmarkSnapshot {
            collection: state.collection.clone(),
            pending: state.pending.clone(),
            loading: state.loading,
            last_error: state.last_error.clone(),
        }
    }

    pub async fn articles(&self) -> Vec<Article> {
        self.state.read().await.collection.articles().to_vec()
    }

    pub async fn is_bookmarked(&self, id: &ArticleId) -> bool {
        self.state.read().await.collection.contains(id)
    }

    /// True while a mutation for this id is waiting on the backend; callers
    /// should keep the triggering control disabled until it clears.
    pub async fn is_pending(&self, id: &ArticleId) -> bool {
        self.state.read().await.pending.contains(id)
    }

    pub async fn last_error(&self) -> Option<String> {
        self.state.read().await.last_error.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{article, id, ScriptedBackend};
    use nr_core::Error;

    #[test]
    fn test_collection_dedupes_on_build() {
        let collection = BookmarkCollection::from_articles(vec![article("a"), article("b"), article("a")]);
        assert_eq!(collection.len(), 2);
        assert!(collection.is_consistent());
    }

    #[test]
    fn test_collection_remove_and_restore() {
        let mut collection = BookmarkCollection::from_articles(vec![article("a"), article("b"), article("c")]);
        let removed = collection.remove(&id("b")).unwrap();
        assert_eq!(removed.index, 1);
        assert!(!collection.contains(&id("b")));
        assert!(collection.is_consistent());

        collection.restore(removed);
        let order: Vec<_> = collection.articles().iter().map(|a| a.id.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
        assert!(collection.is_consistent());
        assert!(collection.remove(&id("zzz")).is_none());
    }

    #[tokio::test]
    async fn test_add_is_idempotent() {
        for mode in [CommitMode::Optimistic, CommitMode::Confirmed] {
            let store = BookmarkStore::new(Arc::new(ScriptedBackend::new(mode)));
            assert!(store.add(article("a")).await.unwrap());
            let before = store.snapshot().await;
            assert!(!store.add(article("a")).await.unwrap());
            assert_eq!(store.snapshot().await, before);
        }
    }

    #[tokio::test]
    async fn test_add_puts_newest_first() {
        let store = BookmarkStore::new(Arc::new(ScriptedBackend::new(CommitMode::Confirmed)));
        store.add(article("a")).await.unwrap();
        store.add(article("b")).await.unwrap();
        let order: Vec<_> = store.articles().await.into_iter().map(|a| a.id.to_string()).collect();
        assert_eq!(order, vec!["b", "a"]);
    }

    #[tokio::test]
    async fn test_remove_absent_is_noop() {
        let backend = Arc::new(ScriptedBackend::new(CommitMode::Optimistic));
        let store = BookmarkStore::new(backend.clone());
        assert!(!store.remove(&id("ghost")).await.unwrap());
        assert_eq!(backend.calls().await, 0);
    }

    #[tokio::test]
    async fn test_failed_add_rolls_back() {
        for mode in [CommitMode::Optimistic, CommitMode::Confirmed] {
            let backend = Arc::new(ScriptedBackend::new(mode));
            let store = BookmarkStore::new(backend.clone());
            store.add(article("keep")).await.unwrap();

            backend.fail_next(Error::Network("offline".into())).await;
            let err = store.add(article("new")).await.unwrap_err();
            assert_eq!(err.to_string(), "Network error: offline");

            let snapshot = store.snapshot().await;
            assert!(snapshot.collection.is_consistent());
            assert!(!snapshot.collection.contains(&id("new")));
            assert!(snapshot.pending.is_empty());
            assert_eq!(snapshot.collection.len(), 1);
            assert_eq!(snapshot.last_error.as_deref(), Some("Network error: offline"));
        }
    }

    #[tokio::test]
    async fn test_failed_remove_restores_position() {
        for mode in [CommitMode::Optimistic, CommitMode::Confirmed] {
            let backend = Arc::new(ScriptedBackend::new(mode));
            let store = BookmarkStore::new(backend.clone());
            for name in ["c", "b", "a"] {
                store.add(article(name)).await.unwrap();
            }

            backend.fail_next(Error::Server { status: 500, message: "down".into() }).await;
            assert!(store.remove(&id("b")).await.is_err());

            let order: Vec<_> = store.articles().await.into_iter().map(|a| a.id.to_string()).collect();
            assert_eq!(order, vec!["a", "b", "c"]);
            assert!(store.snapshot().await.collection.is_consistent());
        }
    }

    #[tokio::test]
    async fn test_load_failure_preserves_state() {
        let backend = Arc::new(ScriptedBackend::new(CommitMode::Optimistic));
        backend.seed(vec![article("x"), article("y")]).await;
        let store = BookmarkStore::new(backend.clone());
        assert_eq!(store.load().await.unwrap(), 2);

        backend.fail_next(Error::Network("offline".into())).await;
        assert!(store.load().await.is_err());

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.collection.len(), 2);
        assert_eq!(snapshot.last_error.as_deref(), Some("Network error: offline"));
        assert!(!snapshot.loading);

        assert_eq!(store.load().await.unwrap(), 2);
        assert_eq!(store.last_error().await, None);
    }

    #[tokio::test]
    async fn test_load_rebuilds_ids() {
        let backend = Arc::new(ScriptedBackend::new(CommitMode::Optimistic));
        backend.seed(vec![article("x"), article("x"), article("y")]).await;
        let store = BookmarkStore::new(backend);
        store.load().await.unwrap();
        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.collection.len(), 2);
        assert!(snapshot.collection.is_consistent());
    }

    #[tokio::test]
    async fn test_toggle() {
        let store = BookmarkStore::new(Arc::new(ScriptedBackend::new(CommitMode::Optimistic)));
        assert!(store.toggle(article("t")).await.unwrap());
        assert!(store.is_bookmarked(&id("t")).await);
        assert!(!store.toggle(article("t")).await.unwrap());
        assert!(!store.is_bookmarked(&id("t")).await);
    }

    #[tokio::test]
    async fn test_clear() {
        let store = BookmarkStore::new(Arc::new(ScriptedBackend::new(CommitMode::Optimistic)));
        store.add(article("a")).await.unwrap();
        store.clear().await;
        let snapshot = store.snapshot().await;
        assert!(snapshot.collection.is_empty());
        assert!(snapshot.collection.ids().is_empty());
    }

    #[tokio::test]
    async fn test_optimistic_add_is_visible_while_pending() {
        let backend = Arc::new(ScriptedBackend::new(CommitMode::Optimistic));
        let gate = backend.hold_next().await;
        let store = Arc::new(BookmarkStore::new(backend.clone()));

        let task = {
            let store = store.clone();
            tokio::spawn(async move { store.add(article("slow")).await })
        };
        while !store.is_pending(&id("slow")).await {
            tokio::task::yield_now().await;
        }
        let snapshot = store.snapshot().await;
        assert!(snapshot.collection.contains(&id("slow")));
        assert!(snapshot.collection.is_consistent());

        gate.notify_one();
        assert!(task.await.unwrap().unwrap());
        assert!(!store.is_pending(&id("slow")).await);
    }

    #[tokio::test]
    async fn test_operations_are_serialized() {
        let backend = Arc::new(ScriptedBackend::new(CommitMode::Confirmed));
        let gate = backend.hold_next().await;
        let store = Arc::new(BookmarkStore::new(backend.clone()));

        let adding = {
            let store = store.clone();
            tokio::spawn(async move { store.add(article("a")).await })
        };
        while !store.is_pending(&id("a")).await {
            tokio::task::yield_now().await;
        }
        let removing = {
            let store = store.clone();
            tokio::spawn(async move { store.remove(&id("a")).await })
        };
        tokio::task::yield_now().await;

        gate.notify_one();
        assert!(adding.await.unwrap().unwrap());
        // The remove waited for the add and therefore found the article
        assert!(removing.await.unwrap().unwrap());
        assert!(store.snapshot().await.collection.is_empty());
    }
}
