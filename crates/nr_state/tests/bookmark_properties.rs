use async_trait::async_trait;
use nr_core::{Article, ArticleId, BookmarkBackend, CommitMode, Error, Result};
use nr_state::{BookmarkStore, LocalBookmarks};
use nr_storage::MemoryStore;
use proptest::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Server-side bookmarks that refuse the next call when told to.
#[derive(Default)]
struct FlakyRemote {
    refuse_next: AtomicBool,
}

impl FlakyRemote {
    fn refuse(&self) -> Result<()> {
        if self.refuse_next.swap(false, Ordering::SeqCst) {
            return Err(Error::Server {
                status: 503,
                message: "unavailable".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl BookmarkBackend for FlakyRemote {
    fn name(&self) -> &'static str {
        "flaky"
    }

    fn commit_mode(&self) -> CommitMode {
        CommitMode::Optimistic
    }

    async fn load(&self) -> Result<Vec<Article>> {
        self.refuse()?;
        Ok(Vec::new())
    }

    async fn add(&self, _article: &Article) -> Result<()> {
        self.refuse()
    }

    async fn remove(&self, _id: &ArticleId) -> Result<()> {
        self.refuse()
    }
}

#[derive(Debug, Clone)]
enum Op {
    Add(u8),
    Remove(u8),
    Toggle(u8),
}

fn op() -> impl Strategy<Value = Op> {
    // A small id space so adds and removes collide often
    prop_oneof![
        (0u8..6).prop_map(Op::Add),
        (0u8..6).prop_map(Op::Remove),
        (0u8..6).prop_map(Op::Toggle),
    ]
}

fn article(n: u8) -> Article {
    let id = ArticleId::parse(&format!("article-{}", n)).unwrap();
    Article::new(id, format!("Headline {}", n))
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #[test]
    fn ids_always_match_sequence(ops in prop::collection::vec(op(), 0..40)) {
        runtime().block_on(async {
            let store = BookmarkStore::new(Arc::new(LocalBookmarks::new(Arc::new(MemoryStore::new()))));
            for op in ops {
                match op {
                    Op::Add(n) => { store.add(article(n)).await.unwrap(); }
                    Op::Remove(n) => { store.remove(&article(n).id).await.unwrap(); }
                    Op::Toggle(n) => { store.toggle(article(n)).await.unwrap(); }
                }
                let snapshot = store.snapshot().await;
                assert!(snapshot.collection.is_consistent());
                assert!(snapshot.pending.is_empty());
            }
        });
    }

    #[test]
    fn second_add_changes_nothing(seed in prop::collection::vec(0u8..6, 0..10), n in 0u8..6) {
        runtime().block_on(async {
            let store = BookmarkStore::new(Arc::new(LocalBookmarks::new(Arc::new(MemoryStore::new()))));
            for s in seed {
                store.add(article(s)).await.unwrap();
            }
            store.add(article(n)).await.unwrap();
            let before = store.snapshot().await;
            assert!(!store.add(article(n)).await.unwrap());
            assert_eq!(store.snapshot().await, before);
        });
    }

    #[test]
    fn removing_absent_is_noop(seed in prop::collection::vec(0u8..6, 0..10)) {
        runtime().block_on(async {
            let store = BookmarkStore::new(Arc::new(LocalBookmarks::new(Arc::new(MemoryStore::new()))));
            for s in seed {
                store.add(article(s)).await.unwrap();
            }
            let before = store.snapshot().await;
            assert!(!store.remove(&article(99).id).await.unwrap());
            assert_eq!(store.snapshot().await, before);
        });
    }

    #[test]
    fn local_reload_preserves_order(seed in prop::collection::vec(0u8..8, 0..16)) {
        runtime().block_on(async {
            let kv = Arc::new(MemoryStore::new());
            let store = BookmarkStore::new(Arc::new(LocalBookmarks::new(kv.clone())));
            for s in seed {
                store.toggle(article(s)).await.unwrap();
            }
            let reloaded = BookmarkStore::new(Arc::new(LocalBookmarks::new(kv)));
            reloaded.load().await.unwrap();
            assert_eq!(reloaded.articles().await, store.articles().await);
        });
    }

    #[test]
    fn rollbacks_keep_ids_in_step(steps in prop::collection::vec((op(), any::<bool>()), 0..40)) {
        runtime().block_on(async {
            let backend = Arc::new(FlakyRemote::default());
            let store = BookmarkStore::new(backend.clone());
            // Ids the collection must hold, most recent first
            let mut expected: Vec<ArticleId> = Vec::new();

            for (op, refused) in steps {
                backend.refuse_next.store(refused, Ordering::SeqCst);
                let (n, adding) = match op {
                    Op::Add(n) => (n, true),
                    Op::Remove(n) => (n, false),
                    Op::Toggle(n) => (n, !expected.contains(&article(n).id)),
                };
                let present = expected.contains(&article(n).id);
                let touches_backend = adding != present;

                let result = match op {
                    Op::Add(n) => store.add(article(n)).await.map(|_| ()),
                    Op::Remove(n) => store.remove(&article(n).id).await.map(|_| ()),
                    Op::Toggle(n) => store.toggle(article(n)).await.map(|_| ()),
                };
                backend.refuse_next.store(false, Ordering::SeqCst);

                if touches_backend && refused {
                    assert!(result.is_err());
                } else {
                    assert!(result.is_ok());
                    if touches_backend && adding {
                        expected.insert(0, article(n).id);
                    } else if touches_backend {
                        expected.retain(|id| id != &article(n).id);
                    }
                }

                let snapshot = store.snapshot().await;
                assert!(snapshot.collection.is_consistent());
                assert!(snapshot.pending.is_empty());
                let ids: Vec<ArticleId> = snapshot.collection.articles().iter().map(|a| a.id.clone()).collect();
                assert_eq!(ids, expected);
            }
        });
    }
}
