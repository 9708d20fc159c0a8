pub mod backends;
pub mod bookmarks;
pub mod feed;
pub mod history;
pub mod pagination;
pub mod reader;

#[cfg(test)]
pub(crate) mod testing;

pub use backends::{create_backend, BookmarkMode, LocalBookmarks, RemoteBookmarks};
pub use bookmarks::{BookmarkCollection, BookmarkSnapshot, BookmarkStore};
pub use feed::{ArticleFeed, FeedOutcome, FeedQuery, FeedSnapshot};
pub use history::SearchHistory;
pub use pagination::{apply_page, Completion, PageRequest, PageState, PagedList};
pub use reader::Reader;

pub mod prelude {
    pub use super::{
        create_backend, ArticleFeed, BookmarkMode, BookmarkStore, FeedOutcome, FeedQuery, Reader,
    };
}
