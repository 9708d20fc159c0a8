//! Response shapes. Servers in the wild wrap payloads as `{"data": ...}` or
//! send them bare; both decode to the same values here.

use nr_core::{Article, Error, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

pub(crate) fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    let mut value: Value = serde_json::from_slice(body)
        .map_err(|e| Error::Malformed(format!("response is not valid JSON: {}", e)))?;
    let wrapped = value.as_object_mut().and_then(|obj| obj.remove("data"));
    let payload = wrapped.unwrap_or(value);
    serde_json::from_value(payload).map_err(|e| Error::Malformed(e.to_string()))
}

/// Error payloads: `{"message": ...}` or `{"error": ...}`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

pub(crate) fn error_message(body: &[u8]) -> Option<String> {
    let parsed: ApiErrorBody = serde_json::from_slice(body).ok()?;
    parsed
        .message
        .or(parsed.error)
        .filter(|message| !message.trim().is_empty())
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum BookmarkListing {
    Entries(Vec<Value>),
    Wrapped { bookmarks: Vec<Value> },
}

impl BookmarkListing {
    /// Entries that cannot be turned into an article are skipped.
    pub(crate) fn into_articles(self) -> Vec<Article> {
        let entries = match self {
            BookmarkListing::Entries(entries) | BookmarkListing::Wrapped { bookmarks: entries } => entries,
        };
        entries.into_iter().filter_map(bookmark_article).collect()
    }
}

/// A bookmark record `{"article": {...}}` or a bare article.
fn bookmark_article(entry: Value) -> Option<Article> {
    let article = match entry {
        Value::Object(mut record) if record.contains_key("article") => {
            match record.remove("article") {
                Some(Value::Null) | None => {
                    warn!("Skipping bookmark whose article no longer exists");
                    return None;
                }
                Some(article) => article,
            }
        }
        other => other,
    };
    match serde_json::from_value(article) {
        Ok(article) => Some(article),
        Err(e) => {
            warn!("Skipping unreadable bookmark: {}", e);
            None
        }
    }
}
