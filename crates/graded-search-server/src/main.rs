//! HTTP search API for the graded-appliance directory.
//!
//! Loads the directory snapshot once at startup (from `DATA_DIR` CSV exports
//! when set, otherwise the embedded sample set) and serves the search routes.

use std::sync::Arc;

use anyhow::Result;
use graded_search::{DirectoryData, DirectorySearcher};
use tracing::info;

mod routes;

#[tokio::main]
async fn main() -> Result<()> {
    graded_search::init_logging(tracing::Level::INFO)?;

    let data = match std::env::var("DATA_DIR") {
        Ok(dir) => DirectoryData::from_csv_dir(&dir)?,
        Err(_) => {
            info!("DATA_DIR not set, serving the embedded sample dataset");
            DirectoryData::sample()
        }
    };
    let searcher = Arc::new(DirectorySearcher::new(data));

    let bind = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&bind).await?;
    info!(addr = %bind, "search API listening");

    axum::serve(listener, routes::router(searcher))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to install shutdown handler");
    }
}
