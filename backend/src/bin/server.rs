//! ABCD analysis HTTP server.
//!
//! Loads configuration, initializes the repository, and serves the REST API.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin abcd-server
//! ANALYSIS_CONFIG=./repository.toml PORT=9000 cargo run --bin abcd-server
//! ```
//!
//! # Environment Variables
//!
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 8080)
//! - `REPOSITORY_TYPE`: Repository backend (only `local`)
//! - `ANALYSIS_CONFIG`: Explicit path to `repository.toml`
//! - `RUST_LOG`: Log level (default: info)

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use abcd_analysis::db::{self, RepositoryConfig};
use abcd_analysis::http::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting ABCD analysis server");

    let config = RepositoryConfig::load().map_err(|e| anyhow::anyhow!(e))?;
    info!(
        "Analysis settings: {} default hours, chunk size {}",
        config.analysis.default_hour_count, config.analysis.batch_chunk_size
    );

    db::init_repository(&config)?;
    let repository = Arc::clone(db::get_repository()?);
    info!("Repository initialized successfully");

    let state = AppState::with_settings(repository, config.analysis);
    let app = create_router(state);

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080);
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
