use async_trait::async_trait;
use nr_core::{Article, ArticleApi, ArticleId, ArticlePage, Error, KeyValueStore, NewsSource, Result};
use nr_storage::{ClientIdentity, SessionStore};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

use crate::config::{AuthMode, ClientConfig};
use crate::envelope::{self, BookmarkListing};

pub const CLIENT_ID_HEADER: &str = "X-Client-Id";

/// How each request is attributed to a caller.
#[derive(Clone)]
pub enum Credentials {
    /// Token looked up on every request so a login or logout takes effect
    /// without rebuilding the client
    Bearer(SessionStore),
    Anonymous(Arc<ClientIdentity>),
}

impl Credentials {
    pub fn for_mode(mode: AuthMode, store: Arc<dyn KeyValueStore>) -> Self {
        match mode {
            AuthMode::Token => Credentials::Bearer(SessionStore::new(store)),
            AuthMode::Anonymous => Credentials::Anonymous(Arc::new(ClientIdentity::new(store))),
        }
    }

    async fn apply(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        match self {
            Credentials::Bearer(session) => match session.token().await {
                Ok(Some(token)) => Ok(request.bearer_auth(token)),
                Ok(None) => Ok(request),
                Err(e) => {
                    warn!("Could not retrieve auth token: {}", e);
                    Ok(request)
                }
            },
            Credentials::Anonymous(identity) => {
                let client_id = identity.client_id().await?;
                Ok(request.header(CLIENT_ID_HEADER, client_id))
            }
        }
    }
}

/// REST client for the article service.
#[derive(Clone)]
pub struct NewsClient {
    http: reqwest::Client,
    config: ClientConfig,
    credentials: Credentials,
}

impl NewsClient {
    pub fn new(config: ClientConfig, store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let credentials = Credentials::for_mode(config.auth, store);
        Self::with_credentials(config, credentials)
    }

    pub fn with_credentials(config: ClientConfig, credentials: Credentials) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            config,
            credentials,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.config.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("{} cannot be a base URL", self.config.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn execute(&self, method: Method, segments: &[&str], query: &[(&str, String)]) -> Result<Vec<u8>> {
        let url = self.endpoint(segments)?;
        debug!("{} {}", method, url);

        let mut request = self.http.request(method.clone(), url.clone());
        if !query.is_empty() {
            request = request.query(query);
        }
        let request = self.credentials.apply(request).await?;

        let response = request.send().await.map_err(|e| {
            warn!("Network error on {} {}: {}", method, url, e);
            Error::from(e)
        })?;

        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            let message = envelope::error_message(&body).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Request failed")
                    .to_string()
            });
            warn!("API error on {} {}: {} {}", method, url, status.as_u16(), message);
            return Err(Error::Server {
                status: status.as_u16(),
                message,
            });
        }
        Ok(body.to_vec())
    }

    async fn fetch<T: DeserializeOwned>(&self, segments: &[&str], query: &[(&str, String)]) -> Result<T> {
        let body = self.execute(Method::GET, segments, query).await?;
        envelope::decode(&body)
    }

    fn page_query(page: u32, limit: u32) -> Vec<(&'static str, String)> {
        vec![("page", page.to_string()), ("limit", limit.to_string())]
    }
}

#[async_trait]
impl ArticleApi for NewsClient {
    async fn list_articles(&self, page: u32, limit: u32) -> Result<ArticlePage> {
        self.fetch(&["articles"], &Self::page_query(page, limit)).await
    }

    async fn search_articles(&self, query: &str, page: u32, limit: u32) -> Result<ArticlePage> {
        let mut params = vec![("q", query.to_string())];
        params.extend(Self::page_query(page, limit));
        self.fetch(&["articles", "search"], &params).await
    }

    async fn articles_by_category(&self, category: &str, page: u32, limit: u32) -> Result<ArticlePage> {
        self.fetch(&["articles", "category", category], &Self::page_query(page, limit))
            .await
    }

    async fn get_article(&self, id: &ArticleId) -> Result<Article> {
        self.fetch(&["articles", id.as_str()], &[]).await
    }

    async fn list_sources(&self) -> Result<Vec<NewsSource>> {
        self.fetch(&["sources"], &[]).await
    }

    async fn list_bookmarks(&self) -> Result<Vec<Article>> {
        let listing: BookmarkListing = self.fetch(&["bookmarks"], &[]).await?;
        Ok(listing.into_articles())
    }

    async fn add_bookmark(&self, id: &ArticleId) -> Result<()> {
        self.execute(Method::POST, &["bookmarks", id.as_str()], &[]).await?;
        Ok(())
    }

    async fn remove_bookmark(&self, id: &ArticleId) -> Result<()> {
        self.execute(Method::DELETE, &["bookmarks", id.as_str()], &[]).await?;
        Ok(())
    }
}
