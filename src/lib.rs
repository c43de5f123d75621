use std::sync::Arc;

use anyhow::Result;
use dotenvy::dotenv;

pub mod ai;
pub mod api;
pub mod config;
pub mod handlers;
pub mod messages;
pub mod recovery;

pub use ai::chat::{ChatClient, TransportError};
pub use ai::vision::{BlipCaptioner, CaptionError, Captioner};
pub use api::{router as api_router, ApiConfig};
pub use config::Config;
pub use handlers::AppState;
pub use recovery::{extract_array, Record, RecoveryError, Reviews};

/// Install the `RUST_LOG`-driven tracing subscriber.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}

// ──────────────────────────────────────────────────────────────
// Server setup
// ──────────────────────────────────────────────────────────────

pub async fn run() -> Result<()> {
    // Load .env file if it exists (for local development)
    dotenv().ok();
    init_tracing();

    tracing::info!("Starting travel guide server...");

    let config = Config::from_env()?;
    tracing::info!(model = %config.ai.model, url = %config.ai.chat_url, "chat API configured");

    let captioner = Arc::new(BlipCaptioner::new(&config.caption));
    if config.caption.preload {
        // A failed preload is retried lazily on the first upload.
        match captioner.preload().await {
            Ok(()) => tracing::info!("caption model preloaded"),
            Err(err) => tracing::warn!(error = %err, "caption model preload failed"),
        }
    }

    let state = AppState::new(ChatClient::new(config.ai.clone()), captioner);
    let app = api::router(
        state,
        ApiConfig {
            static_dir: config.static_dir.clone(),
        },
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, static_dir = ?config.static_dir, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
