pub mod api;
pub mod bookmarks;
pub mod error;
pub mod logging;
pub mod storage;
pub mod text;
pub mod types;

pub use api::ArticleApi;
pub use bookmarks::{BookmarkBackend, CommitMode};
pub use error::{Error, ErrorKind, Result};
pub use storage::KeyValueStore;
pub use types::{Article, ArticleId, ArticlePage, ArticleSource, NewsSource, Pagination};

pub mod prelude {
    pub use super::{Article, ArticleApi, ArticleId, BookmarkBackend, Error, KeyValueStore, Result};
}
