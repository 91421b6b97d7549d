mod config;

use axum::{Json, Router, routing::get};
use rb_api_types::ChainConfigResponse;
use rb_chain_config::ChainRegistry;
use serde::Serialize;
use std::path::Path;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ServerConfig;

const SERVICE_NAME: &str = "swap-devserver";

#[derive(Debug, Serialize)]
struct HealthResponse {
    service: &'static str,
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct VersionResponse {
    service: &'static str,
    version: &'static str,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = ServerConfig::from_env()?;
    if !config.web_root.is_dir() {
        anyhow::bail!("web root {} is not a directory", config.web_root.display());
    }

    let app = app(&config.web_root);

    info!(
        "{} listening on {} serving {}",
        SERVICE_NAME,
        config.listen_addr,
        config.web_root.display()
    );

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn app(web_root: &Path) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/version", get(version))
        .route("/chain/config", get(chain_config))
        .fallback_service(ServeDir::new(web_root))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for ctrl-c: {}", err);
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        service: SERVICE_NAME,
        status: "ok",
    })
}

async fn version() -> Json<VersionResponse> {
    Json(VersionResponse {
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Known chains and the contract set the page wires on each.
async fn chain_config() -> Json<ChainConfigResponse> {
    Json(ChainRegistry::builtin().describe())
}
