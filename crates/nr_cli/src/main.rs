use anyhow::Result;
use clap::{ArgAction, Parser};
use nr_client::{AuthMode, ClientConfig, NewsClient, DEFAULT_BASE_URL, DEFAULT_PAGE_SIZE};
use nr_core::logging::{init_logging, level_for_verbosity};
use nr_core::ArticleApi;
use nr_state::{create_backend, BookmarkMode, Reader};
use nr_storage::{create_store, SessionStore, StoreKind};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

mod commands;
mod duration;

use commands::{handle_command, Commands};
use duration::HumanDuration;

#[derive(Parser, Debug)]
#[command(author, version, about = "Read the news from the terminal", long_about = None)]
pub struct Cli {
    /// Base URL of the article service
    #[arg(long, env = "NR_API_URL", default_value = DEFAULT_BASE_URL)]
    api_url: String,
    /// Request timeout (e.g. 30s, 1m, 500ms)
    #[arg(long, env = "NR_TIMEOUT", default_value = "30s")]
    timeout: HumanDuration,
    #[arg(long, env = "NR_PAGE_SIZE", default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: u32,
    /// Where local state is kept: memory, file or sqlite
    #[arg(long, env = "NR_STORE", default_value = "file")]
    store: StoreKind,
    #[arg(long, env = "NR_STORE_PATH")]
    store_path: Option<PathBuf>,
    /// Keep bookmarks on this device (local) or on the server (remote)
    #[arg(long, env = "NR_BOOKMARKS", default_value = "local")]
    bookmarks: BookmarkMode,
    /// Identify with a stored bearer token or an anonymous client id
    #[arg(long, env = "NR_AUTH", default_value = "anonymous")]
    auth: AuthMode,
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

fn default_store_path(kind: StoreKind) -> PathBuf {
    match kind {
        StoreKind::Sqlite => PathBuf::from("newsreader.db"),
        _ => PathBuf::from("newsreader.json"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(level_for_verbosity(cli.verbose));

    let store_path = cli.store_path.clone().unwrap_or_else(|| default_store_path(cli.store));
    let store = create_store(cli.store, &store_path).await?;
    info!("💾 Store initialized (using {})", cli.store);

    let config = ClientConfig::default()
        .with_url(&cli.api_url)?
        .with_timeout(cli.timeout.0)
        .with_page_size(cli.page_size)?
        .with_auth(cli.auth);
    let page_size = config.page_size;
    info!("🌐 Talking to {} ({} auth)", config.base_url, config.auth);

    let api: Arc<dyn ArticleApi> = Arc::new(NewsClient::new(config, store.clone())?);
    let backend = create_backend(cli.bookmarks, store.clone(), api.clone());
    info!("🔖 Bookmarks are {}", cli.bookmarks);

    let session = SessionStore::new(store);
    let reader = Reader::new(api, backend, session.clone(), page_size);

    if let Err(e) = handle_command(cli.command, &reader, &session).await {
        if let Some(hint) = retry_hint(&e) {
            eprintln!("{}", hint);
        }
        return Err(e);
    }
    Ok(())
}

/// Extra advice for failures that may succeed if simply retried.
fn retry_hint(error: &anyhow::Error) -> Option<&'static str> {
    let retryable = error
        .chain()
        .find_map(|cause| cause.downcast_ref::<nr_core::Error>())
        .is_some_and(nr_core::Error::is_retryable);
    retryable.then_some("The news service may be temporarily unavailable; try again in a moment.")
}
