use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use focusloop_core::storage::Database;
use focusloop_core::{Config, MemoryStore, SystemClock};
use focusloop_server::{app, ServerState};
use tokio::net::TcpListener;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "focusloop-server", version, about = "Focusloop session backend")]
struct Args {
    /// Interface to bind, overriding server.host
    #[arg(long)]
    host: Option<String>,

    /// Port to bind, overriding server.port
    #[arg(long)]
    port: Option<u16>,

    /// SQLite file to use instead of the default data directory
    #[arg(long, conflicts_with = "memory")]
    db: Option<PathBuf>,

    /// Keep sessions in memory only
    #[arg(long)]
    memory: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "focusloop_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = Config::load_or_default();
    let mut server = config.server.clone();
    if let Some(host) = args.host {
        server.host = host;
    }
    if let Some(port) = args.port {
        server.port = port;
    }

    let clock = Arc::new(SystemClock);
    let state = if args.memory {
        tracing::info!("using in-memory session store");
        ServerState::new(MemoryStore::new(), clock)
    } else {
        let db = match &args.db {
            Some(path) => Database::open_at(path),
            None => Database::open(),
        }
        .context("failed to open session database")?;
        ServerState::new(db, clock)
    };
    let state = state.with_daily_goal(config.timer.daily_goal);

    let addr = server.addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app(state)).await?;
    Ok(())
}
