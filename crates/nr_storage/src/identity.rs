use nr_core::{KeyValueStore, Result};
use rand::RngCore;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

pub const CLIENT_ID_KEY: &str = "newsreader/clientId";
const CLIENT_ID_BYTES: usize = 16;

/// Anonymous installation identifier, created on first use and persisted.
pub struct ClientIdentity {
    store: Arc<dyn KeyValueStore>,
    cached: Mutex<Option<String>>,
}

impl ClientIdentity {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            cached: Mutex::new(None),
        }
    }

    /// Returns the persisted identifier, generating and storing one if none
    /// exists yet. Concurrent first calls agree on a single value.
    pub async fn client_id(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;
        if let Some(id) = cached.as_ref() {
            return Ok(id.clone());
        }

        let id = match self.store.get(CLIENT_ID_KEY).await? {
            Some(existing) if !existing.trim().is_empty() => existing,
            _ => {
                let generated = random_hex(CLIENT_ID_BYTES);
                self.store.set(CLIENT_ID_KEY, &generated).await?;
                info!("🆔 Generated new client identifier");
                generated
            }
        };

        *cached = Some(id.clone());
        Ok(id)
    }
}

pub fn random_hex(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    rand::thread_rng().fill_bytes(&mut buf);
    buf.iter().map(|b| format!("{:02x}", b)).collect()
}
