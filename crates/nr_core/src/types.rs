use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::text;
use crate::{Error, Result};

/// Canonical article identifier.
///
/// Upstream payloads carry the identifier as either `id` or `_id`; both are
/// folded into this type when a record is decoded, and nothing past that
/// boundary ever sees the alternate name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ArticleId(String);

impl ArticleId {
    /// Builds an identifier from a single user- or server-supplied string.
    pub fn parse(raw: &str) -> Result<Self> {
        Self::from_fields(Some(raw), None)
            .ok_or_else(|| Error::Malformed("article identifier is empty".to_string()))
    }

    /// First non-empty of the primary and alternate identifier fields.
    pub fn from_fields(primary: Option<&str>, alternate: Option<&str>) -> Option<Self> {
        [primary, alternate]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|candidate| !candidate.is_empty())
            .map(|id| ArticleId(id.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ArticleId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<ArticleId> for String {
    fn from(id: ArticleId) -> Self {
        id.0
    }
}

impl std::str::FromStr for ArticleId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Where an article came from. Some feeds send a bare name, others an object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArticleSource {
    Named(String),
    Detailed {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },
}

impl ArticleSource {
    pub fn display_name(&self) -> &str {
        match self {
            ArticleSource::Named(name) => name,
            ArticleSource::Detailed { name: Some(name), .. } => name,
            ArticleSource::Detailed { .. } => "Unknown source",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawArticle")]
pub struct Article {
    pub id: ArticleId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<ArticleSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Article {
    pub fn new(id: ArticleId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: None,
            summary: None,
            url: None,
            image_url: None,
            source: None,
            published_at: None,
            author: None,
            content: None,
            tags: Vec::new(),
            category: None,
        }
    }

    /// Description if present, otherwise the summary.
    pub fn summary_text(&self) -> Option<&str> {
        self.description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .or(self.summary.as_deref())
    }

    pub fn source_name(&self) -> Option<&str> {
        self.source.as_ref().map(ArticleSource::display_name)
    }

    pub fn display_date(&self) -> Option<String> {
        self.published_at
            .map(|published| published.format("%B %d, %Y").to_string())
    }

    pub fn share_message(&self) -> String {
        format!(
            "Check out this article: {}\n\n{}",
            self.title,
            self.url.as_deref().unwrap_or_default()
        )
    }

    /// Body content with markup stripped, one paragraph per block.
    pub fn plain_content(&self) -> Option<String> {
        self.content
            .as_deref()
            .map(text::plain_text)
            .filter(|body| !body.is_empty())
    }
}

/// Wire shape of an article before identifier normalization.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArticle {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default, rename = "_id")]
    legacy_id: Option<Value>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    source: Option<ArticleSource>,
    #[serde(default)]
    published_at: Option<String>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tags: Option<Vec<String>>,
    #[serde(default)]
    category: Option<String>,
}

fn id_text(value: &Option<Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    tracing::debug!("Ignoring unparseable publish date: {}", raw);
    None
}

impl TryFrom<RawArticle> for Article {
    type Error = Error;

    fn try_from(raw: RawArticle) -> Result<Self> {
        let primary = id_text(&raw.id);
        let alternate = id_text(&raw.legacy_id);
        let id = ArticleId::from_fields(primary.as_deref(), alternate.as_deref()).ok_or_else(|| {
            Error::Malformed(format!(
                "article {:?} has neither `id` nor `_id`",
                raw.title.as_deref().unwrap_or("<untitled>")
            ))
        })?;

        Ok(Article {
            id,
            title: raw.title.unwrap_or_default(),
            description: raw.description,
            summary: raw.summary,
            url: raw.url,
            image_url: raw.image_url,
            source: raw.source,
            published_at: raw.published_at.as_deref().and_then(parse_timestamp),
            author: raw.author,
            content: raw.content,
            tags: raw.tags.unwrap_or_default(),
            category: raw.category,
        })
    }
}

/// A news source descriptor as listed by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsSource {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub pages: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// One page of a paginated article listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticlePage {
    pub articles: Vec<Article>,
    pub pagination: Pagination,
}
