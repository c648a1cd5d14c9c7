use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use article_search::api::{AppState, create_router};
use article_search::client::{Action, History, HttpSearchApi, MemoryHistory, SearchController};
use article_search::config::CONFIG;
use article_search::db::{Database, MongoContentStore};
use article_search::store::{ContentStore, Corpus, InMemoryStore};
use article_search::widget::WidgetConfig;

#[derive(Parser)]
#[command(name = "article-search", about = "Article search endpoint and client")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the search API and the widget assets
    Serve {
        /// Overrides BIND_ADDR
        #[arg(long)]
        bind: Option<String>,
    },
    /// Run the widget client against a running server and print what it shows
    Query(QueryArgs),
    /// Replace the MongoDB corpus with the contents of a JSON file
    Import { path: PathBuf },
}

#[derive(Args)]
struct QueryArgs {
    /// API root of the server
    #[arg(long, default_value = "http://127.0.0.1:3000/api/")]
    url: String,
    /// Address-bar query string the widget starts from, e.g. "q=rust&page=2"
    #[arg(long, default_value = "")]
    location: String,
    /// Widget attributes blob, e.g. '{"postsPerPage":5}'
    #[arg(long)]
    widget: Option<String>,
    #[arg(long)]
    keyword: Option<String>,
    #[arg(long)]
    category: Option<u64>,
    /// Toggle a tag filter; repeatable
    #[arg(long = "tag")]
    tags: Vec<u64>,
    #[arg(long)]
    page: Option<u64>,
}

async fn open_store() -> Result<Arc<dyn ContentStore>> {
    if let Some(path) = CONFIG.corpus_file.as_deref() {
        return Ok(Arc::new(InMemoryStore::from_json_file(path)?));
    }
    let db = Database::from_config()
        .await
        .context("No CORPUS_FILE set and MongoDB is unavailable")?;
    Ok(Arc::new(MongoContentStore::new(db)))
}

async fn serve(bind: Option<String>) -> Result<()> {
    let store = open_store().await?;
    let app = create_router(Arc::new(AppState::new(store)), &CONFIG.static_dir);

    let addr = bind.unwrap_or_else(|| CONFIG.bind_addr.clone());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    log::info!("Listening on {addr}");
    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

async fn query(args: QueryArgs) -> Result<()> {
    let config = args
        .widget
        .as_deref()
        .map(WidgetConfig::from_blob)
        .unwrap_or_default();
    let api = HttpSearchApi::new(&args.url)?;
    let mut controller = SearchController::new(api, MemoryHistory::new(&args.location), config)
        .with_timeout(CONFIG.client_timeout);

    controller.mount().await;
    controller.load_taxonomies().await;

    let mut actions = Vec::new();
    if let Some(keyword) = args.keyword {
        actions.push(Action::SubmitKeyword(keyword));
    }
    if let Some(category) = args.category {
        actions.push(Action::SelectCategory(category));
    }
    actions.extend(args.tags.into_iter().map(Action::ToggleTag));
    if let Some(page) = args.page {
        actions.push(Action::GoToPage(page));
    }
    for action in actions {
        controller.dispatch(action).await;
    }

    print!("{}", controller.render_text());
    println!("\nLocation: ?{}", controller.history().current_query());
    Ok(())
}

async fn import(path: PathBuf) -> Result<()> {
    let corpus = Corpus::from_json_file(&path)?;
    let store = MongoContentStore::new(Database::from_config().await?);
    store.import(&corpus).await
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber (handles both tracing and log crate)
    tracing_subscriber::fmt()
        .with_max_level(CONFIG.tracing_level())
        .with_target(true)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve { bind } => serve(bind).await,
        Command::Query(args) => query(args).await,
        Command::Import { path } => import(path).await,
    }
}
