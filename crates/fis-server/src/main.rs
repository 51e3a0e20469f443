//! fisd - firmware index server daemon.

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use fis_server::Cli;
use fis_server::config::Settings;
use fis_server::routes::build_router;
use fis_server::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let settings = Settings::resolve(&cli)?;
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        listen = %settings.listen,
        upstream = %settings.upstream_url,
        "fisd starting"
    );

    tokio::fs::create_dir_all(settings.public_path.join("json"))
        .await
        .with_context(|| format!("Failed to create {}", settings.public_path.display()))?;

    let listen = settings.listen;
    let state = AppState::new(settings)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .with_context(|| format!("Failed to bind {listen}"))?;
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
