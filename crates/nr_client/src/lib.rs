pub mod client;
pub mod config;
mod envelope;

pub use client::{Credentials, NewsClient, CLIENT_ID_HEADER};
pub use config::{AuthMode, ClientConfig, DEFAULT_BASE_URL, DEFAULT_PAGE_SIZE, REQUEST_TIMEOUT};

pub mod prelude {
    pub use super::{AuthMode, ClientConfig, NewsClient};
    pub use nr_core::{Article, ArticleApi, ArticleId, Error, Result};
}
