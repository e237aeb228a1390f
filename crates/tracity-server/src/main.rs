//! Tracity REST API Server
//!
//! This binary starts the Tracity REST API server, exposing endpoints for
//! dataset listing, filtering, visualization and AI insights.

use std::net::SocketAddr;

use anyhow::Context;
use clap::Parser;
use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

use tracity_client::CompletionProviderEnum;
use tracity_core::load_catalog;
use tracity_core::traits::CompletionProvider;
use tracity_db::DocumentRepository;

use tracity_server::{AppState, ServerConfig, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = ServerConfig::parse();

    info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    DocumentRepository::new(pool.clone())
        .ensure_schema()
        .await
        .context("Failed to prepare documents table")?;
    info!("Database connection established");

    let catalog = load_catalog(config.catalog_config.clone())
        .context("Failed to load collection catalog")?;
    info!(
        "Loaded {} collection schemas from catalog",
        catalog.collections.len()
    );

    let provider = CompletionProviderEnum::from_config(
        config.llm_provider,
        config.openai_api_key.as_deref(),
        config.gemini_api_key.as_deref(),
        config.llm_model.as_deref(),
    )
    .context("Failed to initialize completion provider")?;
    info!(
        "Completion provider: {} ({})",
        provider.name(),
        provider.model()
    );

    let app_state = AppState::new(pool, provider, catalog, config.max_filter_limit);
    let app = create_router(app_state, &config);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid address")?;

    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!("Starting Tracity API server on http://{}", addr);
    info!("Swagger UI available at http://{}/swagger-ui", addr);

    // Peer addresses feed the per-IP rate limiter
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
