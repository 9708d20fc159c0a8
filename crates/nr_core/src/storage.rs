use async_trait::async_trait;
use crate::Result;

/// String-keyed persistent storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value; a missing key is `Ok(None)`, not an error
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing whatever was stored under the key
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a key. Removing a missing key succeeds
    async fn remove(&self, key: &str) -> Result<()>;
}
