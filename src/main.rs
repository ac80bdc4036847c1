use std::sync::Arc;

use anyhow::Context;
use dotenvy::dotenv;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use reel_jobs::config::settings::AppConfig;
use reel_jobs::infrastructure::render::placeholder::PlaceholderRenderer;
use reel_jobs::{create_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = AppConfig::new();
    init_tracing(config.json_logs);

    info!("Starting server...");

    if config.webhook_secret.is_empty() {
        warn!("WEBHOOK_SECRET is not set; webhook signatures will not verify on the receiving side");
    }

    let backend = Arc::new(PlaceholderRenderer::new(config.placeholder()));
    let state = AppState::from_config(&config, backend)
        .context("failed to build webhook client")?;
    let dispatcher = state.dispatcher.clone();

    let app = create_app(state);

    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server running on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    dispatcher.shutdown(config.shutdown_grace()).await;
    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing(json: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info"));

    if json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true))
            .with(env_filter)
            .init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal");
}
