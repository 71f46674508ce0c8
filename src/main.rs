use std::{net::SocketAddr, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use tokio_util::sync::CancellationToken;

use stint::{
    db::Database,
    server::{self, AppState},
    tracker::Tracker,
};

#[derive(Debug, Parser)]
#[command(name = "stint")]
#[command(about = "Personal work-interval tracker with a small HTTP API")]
struct Args {
    /// Path to the SQLite database file.
    #[arg(long, default_value = "./stint.sqlite3")]
    db: PathBuf,
    /// Address to serve the HTTP API on.
    #[arg(long, default_value = "127.0.0.1:8080")]
    bind: SocketAddr,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Args::parse();

    let database = Database::new(args.db)?;

    // The active slot is durable state; an interval left open by a previous
    // run stays open.
    if let Some(started_at) = database.active_started_at().await? {
        info!("Resuming with an interval open since {started_at}");
    }

    let tracker = Tracker::new(database);

    let listener = tokio::net::TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("failed to bind {}", args.bind))?;
    info!("Serving on {}", args.bind);

    let shutdown = CancellationToken::new();
    tokio::spawn(detect_shutdown(shutdown.clone()));

    axum::serve(listener, server::app(AppState { tracker }))
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .context("HTTP server error")?;

    info!("Shut down cleanly");
    Ok(())
}

/// Cancels the token once the process receives an interrupt. In-flight
/// requests drain before the server returns.
async fn detect_shutdown(cancellation: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Interrupt received, shutting down");
    }
    cancellation.cancel();
}
