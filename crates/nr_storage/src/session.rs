use nr_core::{KeyValueStore, Result};
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

pub const TOKEN_KEY: &str = "authToken";
pub const USER_KEY: &str = "user";

#[derive(Debug, Clone, PartialEq)]
pub struct StoredSession {
    pub token: String,
    pub user: Option<Value>,
}

/// Persisted bearer token plus the user record that came with it.
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn token(&self) -> Result<Option<String>> {
        Ok(self
            .store
            .get(TOKEN_KEY)
            .await?
            .filter(|token| !token.trim().is_empty()))
    }

    pub async fn save(&self, token: &str, user: Option<&Value>) -> Result<()> {
        self.store.set(TOKEN_KEY, token).await?;
        match user {
            Some(user) => self.store.set(USER_KEY, &serde_json::to_string(user)?).await,
            None => self.store.remove(USER_KEY).await,
        }
    }

    /// The stored session, if a token is present.
    pub async fn restore(&self) -> Result<Option<StoredSession>> {
        let Some(token) = self.token().await? else {
            return Ok(None);
        };
        let user = match self.store.get(USER_KEY).await? {
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    warn!("Ignoring unreadable stored user record: {}", e);
                    None
                }
            },
            None => None,
        };
        Ok(Some(StoredSession { token, user }))
    }

    pub async fn clear(&self) -> Result<()> {
        self.store.remove(TOKEN_KEY).await?;
        self.store.remove(USER_KEY).await
    }
}
