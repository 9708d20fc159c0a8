use nr_core::{Error, KeyValueStore, Result};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

pub mod backends;
pub mod identity;
pub mod session;

pub use backends::*;
pub use identity::ClientIdentity;
pub use session::{SessionStore, StoredSession};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Memory,
    File,
    Sqlite,
}

impl FromStr for StoreKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreKind::Memory),
            "file" | "json" => Ok(StoreKind::File),
            "sqlite" => Ok(StoreKind::Sqlite),
            other => Err(Error::Config(format!(
                "Unknown store '{}'. Available: memory, file, sqlite",
                other
            ))),
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreKind::Memory => write!(f, "memory"),
            StoreKind::File => write!(f, "file"),
            StoreKind::Sqlite => write!(f, "sqlite"),
        }
    }
}

pub async fn create_store(kind: StoreKind, path: &Path) -> Result<Arc<dyn KeyValueStore>> {
    match kind {
        StoreKind::Memory => Ok(Arc::new(MemoryStore::new())),
        StoreKind::File => Ok(Arc::new(FileStore::open(path).await?)),
        #[cfg(feature = "sqlite")]
        StoreKind::Sqlite => Ok(Arc::new(SqliteStore::open(path).await?)),
        #[cfg(not(feature = "sqlite"))]
        StoreKind::Sqlite => Err(Error::Config(
            "SQLite support not compiled in; rebuild with the `sqlite` feature".to_string(),
        )),
    }
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::{create_store, ClientIdentity, SessionStore, StoreKind};
}
