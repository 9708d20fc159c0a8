use nr_core::{ArticleApi, BookmarkBackend, Error, KeyValueStore, Result};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub mod local;
pub mod remote;

pub use local::{LocalBookmarks, BOOKMARKS_KEY};
pub use remote::RemoteBookmarks;

/// Which bookmark backend a deployment uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BookmarkMode {
    #[default]
    Local,
    Remote,
}

impl FromStr for BookmarkMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "local" => Ok(BookmarkMode::Local),
            "remote" | "server" => Ok(BookmarkMode::Remote),
            other => Err(Error::Config(format!(
                "Unknown bookmark mode '{}'. Available: local, remote",
                other
            ))),
        }
    }
}

impl fmt::Display for BookmarkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookmarkMode::Local => write!(f, "local"),
            BookmarkMode::Remote => write!(f, "remote"),
        }
    }
}

pub fn create_backend(
    mode: BookmarkMode,
    store: Arc<dyn KeyValueStore>,
    api: Arc<dyn ArticleApi>,
) -> Arc<dyn BookmarkBackend> {
    match mode {
        BookmarkMode::Local => Arc::new(LocalBookmarks::new(store)),
        BookmarkMode::Remote => Arc::new(RemoteBookmarks::new(api)),
    }
}
