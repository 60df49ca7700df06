//! Flat-file wiki web server
//!
//! Serves, edits, and persists sanitized HTML pages, one text file per
//! title. Editing is gated by single-use stash tokens: a page must be
//! staged (`/stash/{title}`) before each edit.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wiki_server::editlock::EditLocks;
use wiki_server::handlers::{self, AppState};
use wiki_store::FileStore;

#[derive(Parser, Debug)]
#[command(name = "wiki-server")]
#[command(about = "Flat-file wiki web server")]
struct Cli {
    /// Port to listen on
    #[arg(long, default_value_t = 8080, env = "WIKI_PORT")]
    port: u16,

    /// Address to bind to
    #[arg(long, default_value = "127.0.0.1", env = "WIKI_BIND")]
    bind: String,

    /// Directory where pages are stored
    #[arg(long, default_value = "./paper", env = "WIKI_DATA_PATH")]
    data_path: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wiki_server=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let store = FileStore::open(cli.data_path.as_str()).await?;
    let state = Arc::new(AppState {
        store,
        locks: EditLocks::new(),
    });

    let app = handlers::router(state);

    let addr: SocketAddr = format!("{}:{}", cli.bind, cli.port).parse()?;

    tracing::info!("Starting wiki-server on {}", addr);
    tracing::info!("Serving pages from {}", cli.data_path);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Wiki server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
