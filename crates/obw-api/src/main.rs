//! # obw-api: Binary Entry Point
//!
//! Reads [`ApiConfig`] from the environment, installs the tracing
//! subscriber and serves the API.

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use obw_api::config::{ApiConfig, LogFormat};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ApiConfig::from_env();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
    tracing::info!(?config, "starting plan engine API");

    let port = config.port;
    let state = obw_api::bootstrap::bootstrap(config).context("bootstrap failed")?;
    let app = obw_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
