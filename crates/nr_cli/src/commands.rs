use anyhow::{bail, Context, Result};
use clap::Subcommand;
use nr_core::{Article, ArticleId};
use nr_state::{FeedOutcome, FeedSnapshot, Reader};
use nr_storage::SessionStore;
use tracing::{info, warn};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the latest articles, or one category
    Articles {
        /// Category key (e.g. electric, suv)
        #[arg(long)]
        category: Option<String>,
        /// How many pages to fetch
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// Search articles
    Search {
        query: String,
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// Show one article in full
    Show { id: String },
    /// List news sources
    Sources,
    /// Manage bookmarks
    Bookmarks {
        #[command(subcommand)]
        command: BookmarkCommands,
    },
    /// Manage the stored bearer token
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum BookmarkCommands {
    List,
    Add { id: String },
    Remove { id: String },
    /// Bookmark the article if it is not bookmarked, otherwise remove it
    Toggle { id: String },
    /// Remove every bookmark
    Clear,
}

#[derive(Subcommand, Debug)]
pub enum AuthCommands {
    /// Store a token for `--auth token`
    Token { token: String },
    Logout,
    Status,
}

pub async fn handle_command(command: Commands, reader: &Reader, session: &SessionStore) -> Result<()> {
    match command {
        Commands::Articles { category, pages } => {
            let first = match &category {
                Some(key) => reader.show_category(key).await?,
                None => reader.show_latest().await?,
            };
            if first != FeedOutcome::Idle {
                for _ in 1..pages {
                    if reader.load_more_articles().await? == FeedOutcome::Idle {
                        break;
                    }
                }
            }
            print_feed(&reader.articles().snapshot().await);
        }
        Commands::Search { query, pages } => {
            if reader.search(&query).await? == FeedOutcome::Idle {
                bail!("Search query is empty");
            }
            for _ in 1..pages {
                if reader.load_more_results().await? == FeedOutcome::Idle {
                    break;
                }
            }
            print_feed(&reader.search_results().snapshot().await);
        }
        Commands::Show { id } => {
            let id = ArticleId::parse(&id)?;
            let article = reader.open_article(&id).await?;
            print_detail(&article);
        }
        Commands::Sources => {
            reader.load_sources().await?;
            for source in reader.sources().await {
                match &source.category {
                    Some(category) => println!("{} [{}]", source.name, category),
                    None => println!("{}", source.name),
                }
            }
        }
        Commands::Bookmarks { command } => handle_bookmarks(command, reader).await?,
        Commands::Auth { command } => match command {
            AuthCommands::Token { token } => {
                session.save(token.trim(), None).await?;
                info!("🔑 Token stored");
                println!("Token stored");
            }
            AuthCommands::Logout => {
                reader.logout().await?;
                println!("Logged out");
            }
            AuthCommands::Status => match session.restore().await? {
                Some(_) => println!("Token present"),
                None => println!("No token stored"),
            },
        },
    }
    Ok(())
}

async fn handle_bookmarks(command: BookmarkCommands, reader: &Reader) -> Result<()> {
    let bookmarks = reader.bookmarks();
    bookmarks
        .load()
        .await
        .with_context(|| format!("Could not load {} bookmarks", bookmarks.backend_name()))?;

    match command {
        BookmarkCommands::List => {
            let articles = bookmarks.articles().await;
            if articles.is_empty() {
                println!("No bookmarks yet");
            }
            for (index, article) in articles.iter().enumerate() {
                print_summary(index + 1, article);
            }
        }
        BookmarkCommands::Add { id } => {
            let article = reader.open_article(&ArticleId::parse(&id)?).await?;
            if bookmarks.add(article).await? {
                println!("🔖 Bookmarked {}", id);
            } else {
                println!("Already bookmarked: {}", id);
            }
        }
        BookmarkCommands::Remove { id } => {
            if bookmarks.remove(&ArticleId::parse(&id)?).await? {
                println!("🗑️ Removed {}", id);
            } else {
                println!("Not bookmarked: {}", id);
            }
        }
        BookmarkCommands::Toggle { id } => {
            let id = ArticleId::parse(&id)?;
            let saved = bookmarks.articles().await.into_iter().find(|a| a.id == id);
            let article = match saved {
                Some(article) => article,
                None => reader.open_article(&id).await?,
            };
            let bookmarked = bookmarks.toggle(article).await?;
            println!("{} {}", if bookmarked { "🔖 Bookmarked" } else { "🗑️ Removed" }, id);
        }
        BookmarkCommands::Clear => {
            let mut failed = 0;
            for article in bookmarks.articles().await {
                if let Err(e) = bookmarks.remove(&article.id).await {
                    warn!("Could not remove {}: {}", article.id, e);
                    failed += 1;
                }
            }
            if failed > 0 {
                bail!("{} bookmarks could not be removed", failed);
            }
            println!("Bookmarks cleared");
        }
    }
    Ok(())
}

fn print_feed(snapshot: &FeedSnapshot) {
    if snapshot.articles.is_empty() {
        println!("No articles found");
        return;
    }
    for (index, article) in snapshot.articles.iter().enumerate() {
        print_summary(index + 1, article);
    }
    if snapshot.has_more {
        println!("-- page {} (more available)", snapshot.current_page);
    }
}

fn print_summary(index: usize, article: &Article) {
    let source = article.source_name().unwrap_or("Unknown source");
    let date = article.display_date().unwrap_or_default();
    println!("{:>3}. {} [{}]", index, article.title, article.id);
    println!("     {} {}", source, date);
    if let Some(summary) = article.summary_text() {
        println!("     {}", summary);
    }
}

fn print_detail(article: &Article) {
    println!("{}", article.title);
    if let Some(source) = article.source_name() {
        println!("{}", source);
    }
    if let Some(author) = &article.author {
        println!("By {}", author);
    }
    if let Some(date) = article.display_date() {
        println!("{}", date);
    }
    println!();
    match article.plain_content() {
        Some(body) => println!("{}", body),
        None => {
            if let Some(summary) = article.summary_text() {
                println!("{}", summary);
            }
        }
    }
    if !article.tags.is_empty() {
        println!();
        println!("Tags: {}", article.tags.join(", "));
    }
    println!();
    println!("{}", article.share_message());
}
